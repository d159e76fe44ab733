use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::ticket::{Priority, Ticket, TicketId, TicketStatus};
use crate::errors::DomainError;

use super::thresholds::{SlaThresholds, ThresholdSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaClassification {
    Compliant,
    Warning,
    Breached,
}

/// Outcome of classifying a single snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketCompliance {
    pub ticket_id: TicketId,
    pub status: TicketStatus,
    pub priority: Priority,
    pub elapsed_hours: f64,
    pub threshold_hours: f64,
    pub threshold_source: ThresholdSource,
    pub classification: SlaClassification,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub total: usize,
    pub compliant: usize,
    pub warnings: usize,
    pub breaches: usize,
    pub compliance_rate: f64,
}

impl ComplianceReport {
    /// Builds a report from pre-aggregated counts.
    ///
    /// The compliant count is derived, so `compliant + warnings + breaches`
    /// always equals `total`. Counts that cannot satisfy that identity are
    /// rejected rather than silently clamped.
    pub fn from_counts(total: usize, warnings: usize, breaches: usize) -> Result<Self, DomainError> {
        if warnings.saturating_add(breaches) > total {
            return Err(DomainError::InconsistentAggregateInput { total, warnings, breaches });
        }
        let compliant = total - warnings - breaches;
        let compliance_rate = if total > 0 {
            (compliant as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };
        Ok(Self { total, compliant, warnings, breaches, compliance_rate })
    }
}

/// A snapshot the engine refused to classify, with the reason it was skipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RejectedSnapshot {
    pub ticket_id: TicketId,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlaEvaluation {
    pub records: Vec<TicketCompliance>,
    pub rejected: Vec<RejectedSnapshot>,
    pub report: ComplianceReport,
}

/// An active ticket already past its threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalTicket {
    pub ticket_id: TicketId,
    pub subject: String,
    pub priority: Priority,
    pub elapsed_hours: f64,
    pub threshold_hours: f64,
    pub overrun_hours: f64,
    pub created_at: DateTime<Utc>,
}

/// Classifies one snapshot against the threshold for its priority.
///
/// Active tickets measure elapsed time from `created_at` to `now` and breach
/// once elapsed strictly exceeds the threshold; the warning band starts at
/// `warning_fraction` of the threshold. Settled tickets measure to their
/// `resolved_at` and always classify as compliant. Snapshots that fail
/// [`Ticket::validate`] are rejected.
pub fn classify(
    ticket: &Ticket,
    thresholds: &SlaThresholds,
    warning_fraction: f64,
    now: DateTime<Utc>,
) -> Result<TicketCompliance, DomainError> {
    ticket.validate()?;
    let lookup = thresholds.lookup(ticket.priority);
    let end = match ticket.resolved_at {
        // A stale resolved_at on a reopened ticket does not stop the clock.
        Some(resolved_at) if ticket.status.is_settled() => resolved_at,
        _ => now,
    };
    let elapsed_hours = hours_between(ticket.created_at, end);
    let classification = if ticket.status.is_settled() {
        SlaClassification::Compliant
    } else if elapsed_hours > lookup.hours {
        SlaClassification::Breached
    } else if elapsed_hours >= warning_fraction * lookup.hours {
        SlaClassification::Warning
    } else {
        SlaClassification::Compliant
    };
    Ok(TicketCompliance {
        ticket_id: ticket.id.clone(),
        status: ticket.status,
        priority: ticket.priority,
        elapsed_hours,
        threshold_hours: lookup.hours,
        threshold_source: lookup.source,
        classification,
    })
}

/// Classifies every snapshot and aggregates the outcomes.
///
/// Invalid snapshots are collected into `rejected` instead of aborting the
/// batch; they do not count toward the report total.
pub fn evaluate_compliance(
    tickets: &[Ticket],
    thresholds: &SlaThresholds,
    warning_fraction: f64,
    now: DateTime<Utc>,
) -> Result<SlaEvaluation, DomainError> {
    let mut records = Vec::with_capacity(tickets.len());
    let mut rejected = Vec::new();
    for ticket in tickets {
        match classify(ticket, thresholds, warning_fraction, now) {
            Ok(record) => records.push(record),
            Err(error) => rejected
                .push(RejectedSnapshot { ticket_id: ticket.id.clone(), reason: error.to_string() }),
        }
    }
    let warnings =
        records.iter().filter(|record| record.classification == SlaClassification::Warning).count();
    let breaches =
        records.iter().filter(|record| record.classification == SlaClassification::Breached).count();
    let report = ComplianceReport::from_counts(records.len(), warnings, breaches)?;
    Ok(SlaEvaluation { records, rejected, report })
}

pub fn evaluate_compliance_with_audit<S>(
    tickets: &[Ticket],
    thresholds: &SlaThresholds,
    warning_fraction: f64,
    now: DateTime<Utc>,
    sink: &S,
    audit: &AuditContext,
) -> Result<SlaEvaluation, DomainError>
where
    S: AuditSink,
{
    let result = evaluate_compliance(tickets, thresholds, warning_fraction, now);
    match &result {
        Ok(evaluation) => {
            for record in &evaluation.records {
                if record.threshold_source == ThresholdSource::MediumFallback {
                    sink.emit(
                        AuditEvent::new(
                            Some(record.ticket_id.clone()),
                            audit.correlation_id.clone(),
                            "sla.threshold_fallback",
                            AuditCategory::Sla,
                            audit.actor.clone(),
                            AuditOutcome::Success,
                        )
                        .with_metadata("priority", record.priority.as_str())
                        .with_metadata("threshold_hours", format!("{:.1}", record.threshold_hours)),
                    );
                }
            }
            for rejection in &evaluation.rejected {
                sink.emit(
                    AuditEvent::new(
                        Some(rejection.ticket_id.clone()),
                        audit.correlation_id.clone(),
                        "sla.snapshot_rejected",
                        AuditCategory::Sla,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("reason", rejection.reason.clone()),
                );
            }
            sink.emit(
                AuditEvent::new(
                    audit.ticket_id.clone(),
                    audit.correlation_id.clone(),
                    "sla.evaluation_completed",
                    AuditCategory::Sla,
                    audit.actor.clone(),
                    AuditOutcome::Success,
                )
                .with_metadata("total", evaluation.report.total.to_string())
                .with_metadata("warnings", evaluation.report.warnings.to_string())
                .with_metadata("breaches", evaluation.report.breaches.to_string())
                .with_metadata("rejected", evaluation.rejected.len().to_string())
                .with_metadata(
                    "compliance_rate",
                    format!("{:.1}", evaluation.report.compliance_rate),
                ),
            );
        }
        Err(error) => {
            sink.emit(
                AuditEvent::new(
                    audit.ticket_id.clone(),
                    audit.correlation_id.clone(),
                    "sla.evaluation_failed",
                    AuditCategory::Sla,
                    audit.actor.clone(),
                    AuditOutcome::Failed,
                )
                .with_metadata("error", error.to_string()),
            );
        }
    }
    result
}

/// Lists active tickets already past their threshold, worst overrun first.
///
/// Ties on overrun break toward the older ticket, then the smaller id. The
/// listing is advisory and never errors; settled tickets are excluded.
pub fn critical_tickets(
    tickets: &[Ticket],
    thresholds: &SlaThresholds,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<CriticalTicket> {
    let mut critical: Vec<CriticalTicket> = tickets
        .iter()
        .filter(|ticket| !ticket.status.is_settled())
        .filter_map(|ticket| {
            let lookup = thresholds.lookup(ticket.priority);
            let elapsed_hours = hours_between(ticket.created_at, now);
            let overrun_hours = elapsed_hours - lookup.hours;
            (overrun_hours > 0.0).then(|| CriticalTicket {
                ticket_id: ticket.id.clone(),
                subject: ticket.subject.clone(),
                priority: ticket.priority,
                elapsed_hours,
                threshold_hours: lookup.hours,
                overrun_hours,
                created_at: ticket.created_at,
            })
        })
        .collect();
    critical.sort_by(|a, b| {
        b.overrun_hours
            .partial_cmp(&a.overrun_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.ticket_id.0.cmp(&b.ticket_id.0))
    });
    critical.truncate(limit);
    critical
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}
