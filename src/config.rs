//! Service configuration.
//!
//! Loaded from a TOML file (`aqmon.toml` by default, or the path named by
//! `AQMON_CONFIG`), then adjusted by environment overrides. `.env` is read
//! with dotenv first so local development can keep overrides out of the
//! shell profile.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration pointed at the public Open-Meteo endpoint.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::ingest::history::DEFAULT_DATASET_PATH;
use crate::ingest::retry::RetryPolicy;
use crate::locations::{Location, LocationTable};
use crate::logging::LogLevel;
use crate::model::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "./aqmon.toml";
pub const DEFAULT_BASE_URL: &str = "https://air-quality.open-meteo.com/v1/air-quality";
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Upper bound Open-Meteo accepts for `forecast_days` on this dashboard.
pub const MAX_FORECAST_DAYS: u32 = 5;

const DEFAULT_CURRENT_FIELDS: [&str; 10] = [
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    "dust",
    "uv_index",
    "european_aqi",
    "us_aqi",
];

const DEFAULT_HOURLY_FIELDS: [&str; 8] = [
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    "european_aqi",
    "us_aqi",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timezone: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub current_fields: Vec<String>,
    pub hourly_fields: Vec<String>,
    pub forecast_days: u32,
    pub daily_days: u32,
    /// CSV file backing the `history` queries.
    pub dataset_path: String,
    pub logging: LoggingConfig,
    pub locations: Vec<Location>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            retry_attempts: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            current_fields: DEFAULT_CURRENT_FIELDS.iter().map(|s| s.to_string()).collect(),
            hourly_fields: DEFAULT_HOURLY_FIELDS.iter().map(|s| s.to_string()).collect(),
            forecast_days: 3,
            daily_days: 7,
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
            logging: LoggingConfig::default(),
            locations: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env`, then the file named by `AQMON_CONFIG` (or the default
    /// path), then applies `AQMON_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = std::env::var("AQMON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `AQMON_TIMEZONE`, `AQMON_BASE_URL`, `AQMON_DATASET` and
    /// `AQMON_RETRY_ATTEMPTS` from `lookup`. Takes a lookup function so tests need not touch the
    /// process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timezone) = lookup("AQMON_TIMEZONE") {
            self.timezone = timezone;
        }
        if let Some(base_url) = lookup("AQMON_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(dataset) = lookup("AQMON_DATASET") {
            self.dataset_path = dataset;
        }
        if let Some(attempts) = lookup("AQMON_RETRY_ATTEMPTS") {
            self.retry_attempts = attempts.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("AQMON_RETRY_ATTEMPTS is not a number: '{}'", attempts))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid("retry_attempts must be at least 1".to_string()));
        }
        if self.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid("timezone must not be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if !self.current_fields.iter().any(|f| f == crate::model::FIELD_PM2_5) {
            return Err(ConfigError::Invalid("current_fields must include pm2_5".to_string()));
        }
        if !self.hourly_fields.iter().any(|f| f == crate::model::FIELD_PM2_5) {
            return Err(ConfigError::Invalid("hourly_fields must include pm2_5".to_string()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Built-in cities plus any `[[locations]]` from the config file.
    pub fn location_table(&self) -> LocationTable {
        let mut table = LocationTable::builtin();
        table.extend(self.locations.iter().cloned());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.timezone, "Asia/Kolkata");
        assert_eq!(config.dataset_path, DEFAULT_DATASET_PATH);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let text = r#"
            timezone = "Europe/Berlin"
            retry_attempts = 5

            [logging]
            level = "debug"

            [[locations]]
            name = "Berlin"
            latitude = 52.52
            longitude = 13.405
        "#;
        let config = ServiceConfig::from_toml_str(text).expect("valid config");
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.location_table().find("Berlin").is_some());
        assert!(config.location_table().find("Delhi").is_some());
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let result = ServiceConfig::from_toml_str("retry_attempts = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_fields_without_pm25_are_rejected() {
        let result = ServiceConfig::from_toml_str(r#"current_fields = ["pm10"]"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unparseable_document_is_parse_error() {
        let result = ServiceConfig::from_toml_str("retry_attempts = \"three");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|key| match key {
                "AQMON_TIMEZONE" => Some("UTC".to_string()),
                "AQMON_RETRY_ATTEMPTS" => Some("4".to_string()),
                "AQMON_DATASET" => Some("/data/city_day.csv".to_string()),
                _ => None,
            })
            .expect("overrides should apply");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.retry_attempts, 4);
        assert_eq!(config.dataset_path, "/data/city_day.csv");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        let bad = config.apply_overrides(|key| (key == "AQMON_RETRY_ATTEMPTS").then(|| "many".to_string()));
        assert!(matches!(bad, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ServiceConfig::load("./definitely-not-here.toml").expect("missing file is fine");
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = ServiceConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }
}
