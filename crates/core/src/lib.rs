pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod sla;

pub use domain::actor::{Actor, ActorId, Role};
pub use domain::ticket::{Priority, Ticket, TicketId, TicketStatus};
pub use errors::DomainError;
pub use lifecycle::{AssignLabel, TicketActions};
pub use sla::{
    ComplianceReport, CriticalTicket, RejectedSnapshot, SlaClassification, SlaEvaluation,
    SlaThresholds, ThresholdLookup, ThresholdSource, TicketCompliance,
};
