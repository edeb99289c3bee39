//! # FoodBridge Runtime
//!
//! Owns the subsystem container, the event log task and the shutdown
//! signal, and drives the scripted demo scenario.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use fb_01_donation_lifecycle::{IdGenerator, LifecycleApi, TimeSource};
use fb_02_consolidated_logistics::{CostShare, LogisticsApi, LogisticsOption};
use shared_bus::EventFilter;
use shared_types::{CertificateId, DonationId, Identity, LotId};

use crate::container::{RuntimeConfig, SubsystemContainer};
use crate::handlers::EventLogHandler;
use crate::seed::{demo_donor, seed_demo_data, SeedSummary};
use crate::views::{FoodFormLimits, Page, PageView, Views};

/// Outcome of the demo scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub donation_id: DonationId,
    pub certificate_id: CertificateId,
    pub lot_id: LotId,
    pub cost_share: CostShare,
}

/// The runtime orchestrating both subsystems.
pub struct FoodBridgeRuntime {
    container: Arc<SubsystemContainer>,
    time: Arc<dyn TimeSource>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    event_log: Option<JoinHandle<usize>>,
}

impl FoodBridgeRuntime {
    pub fn new(
        config: RuntimeConfig,
        time: Arc<dyn TimeSource>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        info!("Creating FoodBridge runtime");
        let container = Arc::new(SubsystemContainer::with_ports(config, time.clone(), ids));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            container,
            time,
            shutdown_tx,
            shutdown_rx,
            event_log: None,
        }
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// Renderer over the container's subsystems.
    pub fn views(&self) -> Views<'_> {
        Views::new(
            self.container.lifecycle.as_ref(),
            self.container.logistics.as_ref(),
            FoodFormLimits::from(&self.container.config.lifecycle),
        )
    }

    /// Start the event log and seed demo data if configured.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<Option<SeedSummary>> {
        info!("===========================================");
        info!("  FoodBridge Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let handler = EventLogHandler::new(self.container.subscribe(EventFilter::all()));
        self.event_log = Some(tokio::spawn(handler.run(self.shutdown_rx.clone())));

        if !self.container.config.seed_demo_data {
            info!("Demo data disabled, starting empty");
            return Ok(None);
        }
        let summary = seed_demo_data(&self.container, self.time.now())
            .context("Failed to seed demo data")?;
        Ok(Some(summary))
    }

    /// Walks one donation from reservation to certificate and one lot
    /// through shared logistics.
    pub fn run_demo_scenario(&self, seed: &SeedSummary) -> Result<ScenarioReport> {
        let lifecycle = &self.container.lifecycle;
        let logistics = &self.container.logistics;
        let shelter = Identity::receiver("receiver-shelter");
        let kitchen = Identity::receiver("receiver-kitchen");
        let volunteer = Identity::volunteer("volunteer-sam");
        let donor = demo_donor();

        let item_id = seed
            .food_item_ids
            .first()
            .context("Seed data has no food items")?;
        let donation = lifecycle
            .reserve_food_item(&shelter, item_id)
            .context("Reservation failed")?;
        lifecycle
            .assign_volunteer(&volunteer, &donation.id)
            .context("Volunteer assignment failed")?;

        // Follow the actions the routes page offers until none is left.
        loop {
            let PageView::Routes(routes) = self.views().render_page(&volunteer, Page::Routes)
            else {
                bail!("Routes page rendered an unexpected view");
            };
            let Some(action) = routes
                .routes
                .iter()
                .find(|route| route.donation_id == donation.id)
                .and_then(|route| route.next_action)
            else {
                break;
            };
            lifecycle
                .update_donation_status(&volunteer, &donation.id, action.target_status())
                .with_context(|| format!("Route action {action:?} failed"))?;
        }

        let uncertified: Vec<DonationId> = lifecycle
            .get_uncertified_donations(&donor.id)
            .into_iter()
            .map(|donation| donation.id)
            .collect();
        let certificate = lifecycle
            .generate_tax_certificate(&donor, &uncertified)
            .context("Tax certificate generation failed")?;

        logistics
            .reserve_lot(&kitchen, &seed.lot_id, LogisticsOption::SharedLogistics)
            .context("Lot reservation failed")?;
        logistics
            .join_shared_logistics(&shelter, &seed.lot_id)
            .context("Joining shared logistics failed")?;
        let cost_share = logistics
            .cost_share(&seed.lot_id)
            .context("Cost share unavailable")?;

        for identity in [&donor, &shelter, &volunteer] {
            let view = self.views().render_page(identity, Page::Dashboard);
            let json = serde_json::to_string(&view).context("Failed to serialize view")?;
            debug!(user = %identity.id, role = %identity.role, view = %json, "Dashboard");
        }

        info!(
            donation_id = %donation.id,
            certificate_id = %certificate.id,
            lot_id = %seed.lot_id,
            per_participant_cents = cost_share.per_participant_cents,
            "Demo scenario completed"
        );

        Ok(ScenarioReport {
            donation_id: donation.id,
            certificate_id: certificate.id,
            lot_id: seed.lot_id.clone(),
            cost_share,
        })
    }

    /// Marks expired items, then signals shutdown and waits for the event
    /// log to flush. Returns the number of events logged.
    pub async fn shutdown(&mut self) -> usize {
        info!("Initiating graceful shutdown...");
        let expired = self.container.lifecycle.expire_food_items();
        debug!(expired = expired.len(), "Final expiry sweep");

        let _ = self.shutdown_tx.send(true);
        let logged = match self.event_log.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => 0,
        };

        info!(events = logged, "Shutdown complete");
        logged
    }
}
