//! Domain services for the Consolidated Logistics subsystem.

use super::entities::{ConsolidatedLot, CostShare, LogisticsQuote};

/// Picks the quote to use for a lot.
///
/// Lowest price wins; ties go to the faster quote, then the lower id so
/// the choice is deterministic.
pub fn cheapest_quote<'a, I>(quotes: I) -> Option<&'a LogisticsQuote>
where
    I: IntoIterator<Item = &'a LogisticsQuote>,
{
    quotes
        .into_iter()
        .min_by_key(|quote| (quote.price_cents, quote.estimated_hours, quote.id.clone()))
}

/// Splits `total_cents` evenly, rounding each share up to the cent.
pub fn split_cost(total_cents: u64, parties: usize) -> u64 {
    let parties = parties.max(1) as u64;
    total_cents.div_ceil(parties)
}

/// Cost per paying receiver of `lot` when moved under `quote`.
pub fn cost_share(lot: &ConsolidatedLot, quote: &LogisticsQuote) -> CostShare {
    let participants = lot.paying_parties();
    CostShare {
        lot_id: lot.id.clone(),
        quote_id: quote.id.clone(),
        provider_id: quote.provider_id.clone(),
        total_cents: quote.price_cents,
        participants,
        per_participant_cents: split_cost(quote.price_cents, participants),
    }
}
