//! # Event Handlers
//!
//! Long-running tasks that consume the event bus.

use shared_bus::{DonationEvent, Subscription};
use tokio::sync::watch;
use tracing::info;

/// Records every event published by the subsystems.
pub struct EventLogHandler {
    subscription: Subscription,
}

impl EventLogHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Run the handler loop until the bus closes or shutdown is signalled.
    ///
    /// On shutdown the events already buffered are still logged. Returns the
    /// number of events logged.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> usize {
        info!("[events] Event log handler started");
        let mut logged = 0;

        loop {
            tokio::select! {
                biased;
                event = self.subscription.recv() => match event {
                    Some(event) => {
                        log_event(&event);
                        logged += 1;
                    }
                    None => {
                        info!("[events] Channel closed, exiting");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    for event in self.subscription.drain() {
                        log_event(&event);
                        logged += 1;
                    }
                    info!("[events] Shutdown signal received");
                    break;
                }
            }
        }

        logged
    }
}

fn log_event(event: &DonationEvent) {
    match event {
        DonationEvent::FoodItemPublished {
            item_id,
            donor_id,
            quantity,
            unit,
        } => info!(
            item_id = %item_id,
            donor_id = %donor_id,
            quantity,
            unit = %unit,
            "[events] Food item published"
        ),
        DonationEvent::FoodItemReserved {
            item_id,
            donation_id,
            receiver_id,
        } => info!(
            item_id = %item_id,
            donation_id = %donation_id,
            receiver_id = %receiver_id,
            "[events] Food item reserved"
        ),
        DonationEvent::VolunteerAssigned {
            donation_id,
            volunteer_id,
        } => info!(
            donation_id = %donation_id,
            volunteer_id = %volunteer_id,
            "[events] Volunteer assigned"
        ),
        DonationEvent::DonationStatusChanged {
            donation_id,
            from,
            to,
        } => info!(
            donation_id = %donation_id,
            from = %from,
            to = %to,
            "[events] Donation status changed"
        ),
        DonationEvent::FoodItemsExpired { item_ids, at } => info!(
            count = item_ids.len(),
            at,
            "[events] Food items expired"
        ),
        DonationEvent::TaxCertificateGenerated {
            certificate_id,
            donor_id,
            donation_ids,
        } => info!(
            certificate_id = %certificate_id,
            donor_id = %donor_id,
            donations = donation_ids.len(),
            "[events] Tax certificate generated"
        ),
        DonationEvent::LotCreated {
            lot_id,
            zone,
            item_count,
        } => info!(
            lot_id = %lot_id,
            zone = %zone,
            item_count,
            "[events] Consolidated lot created"
        ),
        DonationEvent::LotReserved {
            lot_id,
            receiver_id,
            logistics_option,
        } => info!(
            lot_id = %lot_id,
            receiver_id = %receiver_id,
            logistics_option = %logistics_option,
            "[events] Consolidated lot reserved"
        ),
        DonationEvent::SharedLogisticsJoined {
            lot_id,
            receiver_id,
            participants,
        } => info!(
            lot_id = %lot_id,
            receiver_id = %receiver_id,
            participants,
            "[events] Shared logistics joined"
        ),
    }
}
