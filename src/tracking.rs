//! Aggregation of classified tickets into report buckets and the diff
//! against the persisted ledger.

use std::collections::HashSet;

use crate::classify;
use crate::config::Config;
use crate::models::{LedgerEntry, SectionGroup, Status, Ticket, TicketBuckets};
use crate::slack::types::Message;

pub const DONE_LABEL: &str = "Tickets ready to be groomed";
pub const IN_PROGRESS_LABEL: &str = "Tickets currently being groomed";
pub const NOT_STARTED_LABEL: &str = "Tickets that need update !!";

/// Partition a batch of raw messages into the three report buckets.
/// Ineligible messages produce no ticket and no diagnostics; input order
/// is preserved within each bucket.
pub fn aggregate(config: &Config, messages: &[Message]) -> TicketBuckets {
    let mut buckets = TicketBuckets {
        done: SectionGroup::new(DONE_LABEL),
        in_progress: SectionGroup::new(IN_PROGRESS_LABEL),
        not_started: SectionGroup::new(NOT_STARTED_LABEL),
    };

    for message in messages {
        if !classify::is_eligible(message) {
            continue;
        }

        let ticket = classify::build_ticket(config, message);
        match ticket.status {
            Status::Done => buckets.done.tickets.push(ticket),
            Status::InProgress => buckets.in_progress.tickets.push(ticket),
            Status::NotStarted => buckets.not_started.tickets.push(ticket),
        }
    }

    buckets
}

/// Tickets classified done this run whose id the ledger has never seen,
/// in the done bucket's order. This is both what gets appended to the
/// ledger and the only content of the report's done section.
pub fn diff_newly_done(ledger: &[LedgerEntry], buckets: &TicketBuckets) -> Vec<Ticket> {
    let known: HashSet<&str> = ledger.iter().map(|entry| entry.id.as_str()).collect();

    buckets
        .done
        .tickets
        .iter()
        .filter(|ticket| !known.contains(ticket.id.as_str()))
        .cloned()
        .collect()
}
