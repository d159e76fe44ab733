use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tickety_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use tickety_core::sla::critical_tickets;
use tickety_core::CriticalTicket;

use crate::commands::{snapshots, CommandResult};

pub fn run(file: &Path, limit: Option<usize>, at: Option<&str>) -> CommandResult {
    // --limit rides the override layer and is validated with the rest of
    // the config.
    let options = LoadOptions {
        overrides: ConfigOverrides { critical_limit: limit, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("critical", "config_validation", error.to_string(), 2);
        }
    };

    let now = match snapshots::resolve_now(at) {
        Ok(now) => now,
        Err(error) => {
            return CommandResult::failure("critical", "timestamp_parse", format!("{error:#}"), 3);
        }
    };

    let tickets = match snapshots::load(file) {
        Ok(tickets) => tickets,
        Err(error) => {
            return CommandResult::failure("critical", "snapshot_load", format!("{error:#}"), 4);
        }
    };

    let limit = config.sla.critical_limit;
    let listing = critical_tickets(&tickets, &config.sla.thresholds(), limit, now);

    #[derive(Serialize)]
    struct CriticalOutput {
        command: &'static str,
        evaluated_at: DateTime<Utc>,
        limit: usize,
        considered: usize,
        listed: usize,
        tickets: Vec<CriticalTicket>,
    }

    let payload = CriticalOutput {
        command: "critical",
        evaluated_at: now,
        limit,
        considered: tickets.len(),
        listed: listing.len(),
        tickets: listing,
    };

    let output = serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"critical\",\"status\":\"error\",\"error\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });

    CommandResult { exit_code: 0, output }
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
