use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ticket::Priority;
use crate::sla::{
    SlaThresholds, DEFAULT_CRITICAL_LIMIT, DEFAULT_HIGH_HOURS, DEFAULT_LOW_HOURS,
    DEFAULT_MEDIUM_HOURS, DEFAULT_URGENT_HOURS, DEFAULT_WARNING_FRACTION,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sla: SlaConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlaConfig {
    pub low_hours: f64,
    pub medium_hours: f64,
    pub high_hours: f64,
    pub urgent_hours: f64,
    pub warning_fraction: f64,
    pub critical_limit: usize,
}

impl SlaConfig {
    /// Builds the full threshold table backed by this config. The table is
    /// always complete, so lookups only hit the medium fallback when callers
    /// assemble their own partial tables.
    pub fn thresholds(&self) -> SlaThresholds {
        SlaThresholds::new()
            .with_hours(Priority::Low, self.low_hours)
            .with_hours(Priority::Medium, self.medium_hours)
            .with_hours(Priority::High, self.high_hours)
            .with_hours(Priority::Urgent, self.urgent_hours)
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub warning_fraction: Option<f64>,
    pub critical_limit: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sla: SlaConfig {
                low_hours: DEFAULT_LOW_HOURS,
                medium_hours: DEFAULT_MEDIUM_HOURS,
                high_hours: DEFAULT_HIGH_HOURS,
                urgent_hours: DEFAULT_URGENT_HOURS,
                warning_fraction: DEFAULT_WARNING_FRACTION,
                critical_limit: DEFAULT_CRITICAL_LIMIT,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("tickety.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(sla) = patch.sla {
            if let Some(low_hours) = sla.low_hours {
                self.sla.low_hours = low_hours;
            }
            if let Some(medium_hours) = sla.medium_hours {
                self.sla.medium_hours = medium_hours;
            }
            if let Some(high_hours) = sla.high_hours {
                self.sla.high_hours = high_hours;
            }
            if let Some(urgent_hours) = sla.urgent_hours {
                self.sla.urgent_hours = urgent_hours;
            }
            if let Some(warning_fraction) = sla.warning_fraction {
                self.sla.warning_fraction = warning_fraction;
            }
            if let Some(critical_limit) = sla.critical_limit {
                self.sla.critical_limit = critical_limit;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TICKETY_SLA_LOW_HOURS") {
            self.sla.low_hours = parse_f64("TICKETY_SLA_LOW_HOURS", &value)?;
        }
        if let Some(value) = read_env("TICKETY_SLA_MEDIUM_HOURS") {
            self.sla.medium_hours = parse_f64("TICKETY_SLA_MEDIUM_HOURS", &value)?;
        }
        if let Some(value) = read_env("TICKETY_SLA_HIGH_HOURS") {
            self.sla.high_hours = parse_f64("TICKETY_SLA_HIGH_HOURS", &value)?;
        }
        if let Some(value) = read_env("TICKETY_SLA_URGENT_HOURS") {
            self.sla.urgent_hours = parse_f64("TICKETY_SLA_URGENT_HOURS", &value)?;
        }
        if let Some(value) = read_env("TICKETY_SLA_WARNING_FRACTION") {
            self.sla.warning_fraction = parse_f64("TICKETY_SLA_WARNING_FRACTION", &value)?;
        }
        if let Some(value) = read_env("TICKETY_SLA_CRITICAL_LIMIT") {
            self.sla.critical_limit = parse_usize("TICKETY_SLA_CRITICAL_LIMIT", &value)?;
        }

        let log_level = read_env("TICKETY_LOGGING_LEVEL").or_else(|| read_env("TICKETY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TICKETY_LOGGING_FORMAT").or_else(|| read_env("TICKETY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(warning_fraction) = overrides.warning_fraction {
            self.sla.warning_fraction = warning_fraction;
        }
        if let Some(critical_limit) = overrides.critical_limit {
            self.sla.critical_limit = critical_limit;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sla(&self.sla)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("tickety.toml"), PathBuf::from("config/tickety.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_sla(sla: &SlaConfig) -> Result<(), ConfigError> {
    validate_hours("sla.low_hours", sla.low_hours)?;
    validate_hours("sla.medium_hours", sla.medium_hours)?;
    validate_hours("sla.high_hours", sla.high_hours)?;
    validate_hours("sla.urgent_hours", sla.urgent_hours)?;

    if !sla.warning_fraction.is_finite()
        || sla.warning_fraction <= 0.0
        || sla.warning_fraction > 1.0
    {
        return Err(ConfigError::Validation(
            "sla.warning_fraction must be greater than 0 and at most 1".to_string(),
        ));
    }

    if sla.critical_limit == 0 {
        return Err(ConfigError::Validation(
            "sla.critical_limit must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_hours(field: &str, hours: f64) -> Result<(), ConfigError> {
    // 8760 hours is one year; anything above that is a typo, not a policy.
    if !hours.is_finite() || hours <= 0.0 || hours > 8760.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than zero and at most 8760"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    sla: Option<SlaPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlaPatch {
    low_hours: Option<f64>,
    medium_hours: Option<f64>,
    high_hours: Option<f64>,
    urgent_hours: Option<f64>,
    warning_fraction: Option<f64>,
    critical_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const TICKETY_VARS: [&str; 10] = [
        "TICKETY_SLA_LOW_HOURS",
        "TICKETY_SLA_MEDIUM_HOURS",
        "TICKETY_SLA_HIGH_HOURS",
        "TICKETY_SLA_URGENT_HOURS",
        "TICKETY_SLA_WARNING_FRACTION",
        "TICKETY_SLA_CRITICAL_LIMIT",
        "TICKETY_LOGGING_LEVEL",
        "TICKETY_LOGGING_FORMAT",
        "TICKETY_LOG_LEVEL",
        "TICKETY_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn default_config_is_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.sla.medium_hours == 24.0, "default medium threshold should be 24 hours")?;
        ensure(config.sla.urgent_hours == 1.0, "default urgent threshold should be 1 hour")?;
        ensure(config.sla.critical_limit == 5, "default critical limit should be 5")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        env::set_var("TEST_TICKETY_LOG_LEVEL", "debug");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tickety.toml");
            fs::write(
                &path,
                r#"
[logging]
level = "${TEST_TICKETY_LOG_LEVEL}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.logging.level == "debug",
                "log level should be interpolated from environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_TICKETY_LOG_LEVEL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        env::set_var("TICKETY_LOG_LEVEL", "warn");
        env::set_var("TICKETY_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["TICKETY_LOG_LEVEL", "TICKETY_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        env::set_var("TICKETY_SLA_MEDIUM_HOURS", "40");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tickety.toml");
            fs::write(
                &path,
                r#"
[sla]
medium_hours = 30.0
high_hours = 6.0

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    critical_limit: Some(9),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.sla.medium_hours == 40.0, "env medium threshold should win over file")?;
            ensure(config.sla.high_hours == 6.0, "file high threshold should win over default")?;
            ensure(config.sla.low_hours == 72.0, "untouched low threshold should keep default")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.sla.critical_limit == 9, "overridden critical limit should win")?;
            Ok(())
        })();

        clear_vars(&["TICKETY_SLA_MEDIUM_HOURS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        env::set_var("TICKETY_SLA_WARNING_FRACTION", "1.5");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("sla.warning_fraction")
            );
            ensure(has_message, "validation failure should mention sla.warning_fraction")
        })();

        clear_vars(&["TICKETY_SLA_WARNING_FRACTION"]);
        result
    }

    #[test]
    fn invalid_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&TICKETY_VARS);

        env::set_var("TICKETY_SLA_CRITICAL_LIMIT", "plenty");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            let matches_key = matches!(
                error,
                ConfigError::InvalidEnvOverride { ref key, ref value }
                    if key == "TICKETY_SLA_CRITICAL_LIMIT" && value == "plenty"
            );
            ensure(matches_key, "error should name the offending variable and value")
        })();

        clear_vars(&["TICKETY_SLA_CRITICAL_LIMIT"]);
        result
    }
}
