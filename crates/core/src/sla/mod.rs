//! SLA compliance engine.
//!
//! Classifies ticket snapshots against per-priority response thresholds and
//! aggregates the results into a [`ComplianceReport`]. Evaluation is a pure
//! function of the snapshots, the thresholds, and an explicit `now` instant,
//! so the same input always yields the same report.

mod engine;
mod thresholds;

pub use engine::{
    classify, critical_tickets, evaluate_compliance, evaluate_compliance_with_audit,
    ComplianceReport, CriticalTicket, RejectedSnapshot, SlaClassification, SlaEvaluation,
    TicketCompliance,
};
pub use thresholds::{SlaThresholds, ThresholdLookup, ThresholdSource};

/// Built-in response thresholds, in hours, used when no configuration is supplied.
pub const DEFAULT_LOW_HOURS: f64 = 72.0;
pub const DEFAULT_MEDIUM_HOURS: f64 = 24.0;
pub const DEFAULT_HIGH_HOURS: f64 = 8.0;
pub const DEFAULT_URGENT_HOURS: f64 = 1.0;

/// Fraction of the threshold at which an active ticket starts to warn.
pub const DEFAULT_WARNING_FRACTION: f64 = 0.8;

/// Default cap on the critical-ticket listing.
pub const DEFAULT_CRITICAL_LIMIT: usize = 5;
