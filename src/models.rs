use serde::{Deserialize, Serialize};

/// Workflow state of a ticket, derived from its approval reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Done,
    InProgress,
    NotStarted,
}

/// One classified unit of work, built fresh from a channel message every
/// run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique id of the originating message; sole equality key for diffing.
    pub id: String,
    /// First line of the message body.
    pub title: String,
    /// Slack timestamp of the originating message ("seconds.fraction").
    pub timestamp: String,
    pub status: Status,
    /// Users behind the reaction that determined the status. Duplicates
    /// from the source data are preserved.
    pub approvers: Vec<String>,
}

/// A labeled, ordered group of tickets for one report section.
#[derive(Debug, Clone)]
pub struct SectionGroup {
    pub label: String,
    pub tickets: Vec<Ticket>,
}

impl SectionGroup {
    pub fn new(label: &str) -> Self {
        SectionGroup {
            label: label.to_string(),
            tickets: Vec::new(),
        }
    }
}

/// One run's classification result: every ticket lands in exactly one
/// group, in the same relative order as the input messages.
#[derive(Debug, Clone)]
pub struct TicketBuckets {
    pub done: SectionGroup,
    pub in_progress: SectionGroup,
    pub not_started: SectionGroup,
}

/// A ticket that has ever reached done status, as persisted in the
/// append-only ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub title: String,
    pub timestamp: String,
}

impl From<&Ticket> for LedgerEntry {
    fn from(ticket: &Ticket) -> Self {
        LedgerEntry {
            id: ticket.id.clone(),
            title: ticket.title.clone(),
            timestamp: ticket.timestamp.clone(),
        }
    }
}
