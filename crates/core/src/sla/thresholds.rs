use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ticket::Priority;

use super::{DEFAULT_HIGH_HOURS, DEFAULT_LOW_HOURS, DEFAULT_MEDIUM_HOURS, DEFAULT_URGENT_HOURS};

/// Where a threshold value came from during lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// The priority had its own configured entry.
    Configured,
    /// The priority had no entry; the medium threshold stood in for it.
    MediumFallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdLookup {
    pub hours: f64,
    pub source: ThresholdSource,
}

/// Per-priority response thresholds, in hours.
///
/// The table may be partial. Lookups for a missing priority fall back to the
/// configured medium threshold, and to the built-in medium default when even
/// that entry is absent, so lookup never fails.
#[derive(Clone, Debug, PartialEq)]
pub struct SlaThresholds {
    hours_by_priority: BTreeMap<Priority, f64>,
}

impl SlaThresholds {
    /// An empty table; every lookup resolves through the medium fallback.
    pub fn new() -> Self {
        Self { hours_by_priority: BTreeMap::new() }
    }

    pub fn with_hours(mut self, priority: Priority, hours: f64) -> Self {
        self.hours_by_priority.insert(priority, hours);
        self
    }

    pub fn lookup(&self, priority: Priority) -> ThresholdLookup {
        if let Some(&hours) = self.hours_by_priority.get(&priority) {
            return ThresholdLookup { hours, source: ThresholdSource::Configured };
        }
        let hours = self
            .hours_by_priority
            .get(&Priority::Medium)
            .copied()
            .unwrap_or(DEFAULT_MEDIUM_HOURS);
        ThresholdLookup { hours, source: ThresholdSource::MediumFallback }
    }
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self::new()
            .with_hours(Priority::Low, DEFAULT_LOW_HOURS)
            .with_hours(Priority::Medium, DEFAULT_MEDIUM_HOURS)
            .with_hours(Priority::High, DEFAULT_HIGH_HOURS)
            .with_hours(Priority::Urgent, DEFAULT_URGENT_HOURS)
    }
}
