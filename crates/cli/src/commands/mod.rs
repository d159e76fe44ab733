pub mod actions;
pub mod config;
pub mod critical;
pub mod doctor;
pub mod report;
pub mod snapshots;

use serde::Serialize;
use tickety_core::audit::{AuditEvent, AuditOutcome};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Replays engine audit events onto the tracing pipeline. Rejections and
/// threshold fallbacks land at warn so operators see them without -v.
pub(crate) fn forward_audit_events(events: &[AuditEvent]) {
    for event in events {
        let ticket_id = event.ticket_id.as_ref().map(|id| id.0.as_str()).unwrap_or("-");
        let detail = event
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        let noteworthy = event.outcome != AuditOutcome::Success
            || event.event_type == "sla.threshold_fallback";

        if noteworthy {
            tracing::warn!(
                event_name = event.event_type.as_str(),
                ticket_id,
                correlation_id = event.correlation_id.as_str(),
                "{detail}"
            );
        } else {
            tracing::debug!(
                event_name = event.event_type.as_str(),
                ticket_id,
                correlation_id = event.correlation_id.as_str(),
                "{detail}"
            );
        }
    }
}
