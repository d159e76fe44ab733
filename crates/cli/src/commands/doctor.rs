use serde::Serialize;
use tickety_core::config::{AppConfig, LoadOptions};
use tickety_core::sla::ThresholdSource;
use tickety_core::Priority;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_threshold_coverage(&config));
            checks.push(check_threshold_ordering(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "threshold_coverage",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "threshold_ordering",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_threshold_coverage(config: &AppConfig) -> DoctorCheck {
    let thresholds = config.sla.thresholds();
    let fallbacks: Vec<&str> = Priority::ALL
        .into_iter()
        .filter(|priority| thresholds.lookup(*priority).source == ThresholdSource::MediumFallback)
        .map(|priority| priority.as_str())
        .collect();

    if fallbacks.is_empty() {
        DoctorCheck {
            name: "threshold_coverage",
            status: CheckStatus::Pass,
            details: format!(
                "low={}h medium={}h high={}h urgent={}h",
                config.sla.low_hours,
                config.sla.medium_hours,
                config.sla.high_hours,
                config.sla.urgent_hours
            ),
        }
    } else {
        DoctorCheck {
            name: "threshold_coverage",
            status: CheckStatus::Fail,
            details: format!(
                "priorities relying on the medium fallback: {}",
                fallbacks.join(", ")
            ),
        }
    }
}

fn check_threshold_ordering(config: &AppConfig) -> DoctorCheck {
    let sla = &config.sla;
    let monotonic = sla.urgent_hours <= sla.high_hours
        && sla.high_hours <= sla.medium_hours
        && sla.medium_hours <= sla.low_hours;

    if monotonic {
        DoctorCheck {
            name: "threshold_ordering",
            status: CheckStatus::Pass,
            details: "urgent <= high <= medium <= low holds".to_string(),
        }
    } else {
        DoctorCheck {
            name: "threshold_ordering",
            status: CheckStatus::Fail,
            details: "threshold hours are not monotonic across priorities; check for swapped values"
                .to_string(),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
