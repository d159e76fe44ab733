use std::path::Path;

use serde::Serialize;
use tickety_core::audit::{AuditContext, InMemoryAuditSink};
use tickety_core::lifecycle::{evaluate_actions_with_audit, TicketActions};
use tickety_core::{Actor, Role};
use uuid::Uuid;

use crate::commands::{forward_audit_events, snapshots, CommandResult};

pub fn run(file: &Path, actor_id: &str, role: &str) -> CommandResult {
    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(error) => {
            return CommandResult::failure("actions", "role_parse", error.to_string(), 2);
        }
    };

    let tickets = match snapshots::load(file) {
        Ok(tickets) => tickets,
        Err(error) => {
            return CommandResult::failure("actions", "snapshot_load", format!("{error:#}"), 3);
        }
    };

    let actor = Actor::new(actor_id, role);
    let sink = InMemoryAuditSink::default();
    let audit = AuditContext::new(None, Uuid::new_v4().to_string(), "cli");

    #[derive(Serialize)]
    struct ActionsRow<'a> {
        ticket_id: &'a str,
        subject: &'a str,
        status: &'static str,
        actions: TicketActions,
    }

    let rows: Vec<ActionsRow> = tickets
        .iter()
        .map(|ticket| ActionsRow {
            ticket_id: &ticket.id.0,
            subject: &ticket.subject,
            status: ticket.status.as_str(),
            actions: evaluate_actions_with_audit(ticket, &actor, &sink, &audit),
        })
        .collect();

    forward_audit_events(&sink.events());

    #[derive(Serialize)]
    struct ActionsOutput<'a> {
        command: &'static str,
        actor_id: &'a str,
        role: &'static str,
        evaluated: usize,
        actions: Vec<ActionsRow<'a>>,
    }

    let payload = ActionsOutput {
        command: "actions",
        actor_id,
        role: role.as_str(),
        evaluated: rows.len(),
        actions: rows,
    };

    let output = serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"actions\",\"status\":\"error\",\"error\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });

    CommandResult { exit_code: 0, output }
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
