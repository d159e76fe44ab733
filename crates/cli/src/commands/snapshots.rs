use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tickety_core::Ticket;

/// Reads an array of ticket snapshots from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<Vec<Ticket>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read snapshot file `{}`", path.display()))?;
    let tickets = serde_json::from_str::<Vec<Ticket>>(&raw)
        .with_context(|| format!("could not parse snapshot file `{}`", path.display()))?;
    Ok(tickets)
}

/// Resolves the evaluation instant: an explicit RFC 3339 value, or the wall clock.
pub fn resolve_now(at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match at {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw.trim())
                .with_context(|| format!("invalid timestamp `{raw}` (expected RFC 3339)"))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}
