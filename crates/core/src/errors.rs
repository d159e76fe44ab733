use thiserror::Error;

use crate::domain::ticket::TicketId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid ticket state for `{ticket_id}`: {reason}")]
    InvalidTicketState { ticket_id: TicketId, reason: String },
    #[error("inconsistent aggregate input: warnings {warnings} + breaches {breaches} exceed total {total}")]
    InconsistentAggregateInput { total: usize, warnings: usize, breaches: usize },
}
