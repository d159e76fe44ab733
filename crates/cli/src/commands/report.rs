use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tickety_core::audit::{AuditContext, InMemoryAuditSink};
use tickety_core::config::{AppConfig, LoadOptions};
use tickety_core::sla::evaluate_compliance_with_audit;
use tickety_core::{ComplianceReport, RejectedSnapshot, TicketCompliance};
use uuid::Uuid;

use crate::commands::{forward_audit_events, snapshots, CommandResult};

pub fn run(file: &Path, at: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("report", "config_validation", error.to_string(), 2);
        }
    };

    let now = match snapshots::resolve_now(at) {
        Ok(now) => now,
        Err(error) => {
            return CommandResult::failure("report", "timestamp_parse", format!("{error:#}"), 3);
        }
    };

    let tickets = match snapshots::load(file) {
        Ok(tickets) => tickets,
        Err(error) => {
            return CommandResult::failure("report", "snapshot_load", format!("{error:#}"), 4);
        }
    };

    let sink = InMemoryAuditSink::default();
    let audit = AuditContext::new(None, Uuid::new_v4().to_string(), "cli");
    let evaluation = match evaluate_compliance_with_audit(
        &tickets,
        &config.sla.thresholds(),
        config.sla.warning_fraction,
        now,
        &sink,
        &audit,
    ) {
        Ok(evaluation) => evaluation,
        Err(error) => {
            forward_audit_events(&sink.events());
            return CommandResult::failure("report", "evaluation_error", error.to_string(), 5);
        }
    };

    forward_audit_events(&sink.events());

    #[derive(Serialize)]
    struct ReportOutput {
        command: &'static str,
        evaluated_at: DateTime<Utc>,
        report: ComplianceReport,
        records: Vec<TicketCompliance>,
        rejected: Vec<RejectedSnapshot>,
    }

    let payload = ReportOutput {
        command: "report",
        evaluated_at: now,
        report: evaluation.report,
        records: evaluation.records,
        rejected: evaluation.rejected,
    };

    let output = serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"report\",\"status\":\"error\",\"error\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });

    CommandResult { exit_code: 0, output }
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
