//! Location → normalized reading pipeline.
//!
//! `ReadingAssembler` owns everything a single request needs: the transport,
//! the backoff sleeper, the coordinate table and the request configuration.
//! Each call resolves the location, fetches with retry, then parses and
//! classifies. Failures propagate unchanged; nothing here substitutes sample
//! data or defaults for a failed fetch.

use reqwest::Url;

use crate::analysis::daily::aggregate_daily;
use crate::config::{MAX_FORECAST_DAYS, ServiceConfig};
use crate::ingest::openmeteo::{
    build_current_url, build_hourly_url, parse_current_response, parse_hourly_response,
};
use crate::ingest::retry::{JsonFetcher, RetryPolicy, Sleeper, ThreadSleeper, fetch_json_with_retry};
use crate::locations::{Location, LocationTable};
use crate::logging::{self, DataSource};
use crate::model::{AqError, ConfigError, DailySummary, Reading};

pub struct ReadingAssembler<F, S = ThreadSleeper> {
    fetcher: F,
    sleeper: S,
    locations: LocationTable,
    config: ServiceConfig,
    base_url: Url,
    policy: RetryPolicy,
}

impl ReadingAssembler<reqwest::blocking::Client, ThreadSleeper> {
    /// Production assembler: reqwest blocking client with the configured
    /// timeout, real sleeps, built-in plus configured locations.
    pub fn from_config(config: ServiceConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let locations = config.location_table();
        Ok(Self::new(client, ThreadSleeper, locations, config)?)
    }
}

impl<F, S> ReadingAssembler<F, S>
where
    F: JsonFetcher,
    S: Sleeper,
{
    pub fn new(
        fetcher: F,
        sleeper: S,
        locations: LocationTable,
        config: ServiceConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {}", config.base_url, e)))?;
        let policy = config.retry_policy();
        Ok(Self {
            fetcher,
            sleeper,
            locations,
            config,
            base_url,
            policy,
        })
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    fn resolve(&self, name: &str) -> Result<&Location, AqError> {
        self.locations
            .find(name)
            .ok_or_else(|| AqError::LocationNotFound(name.to_string()))
    }

    /// Latest sample for `location`, indexed and classified from PM2.5.
    pub fn assemble_current_reading(&self, location: &str) -> Result<Reading, AqError> {
        let coords = self.resolve(location)?;
        let url = build_current_url(
            &self.base_url,
            coords,
            &self.config.current_fields,
            &self.config.timezone,
        );

        logging::debug(DataSource::OpenMeteo, Some(location), &format!("GET {}", url));
        let payload = fetch_json_with_retry(&self.fetcher, &self.sleeper, &url, &self.policy)?;
        parse_current_response(location, payload)
    }

    /// Hourly readings for the next `days` days (capped at five).
    pub fn assemble_hourly_readings(&self, location: &str, days: u32) -> Result<Vec<Reading>, AqError> {
        let coords = self.resolve(location)?;
        let forecast_days = days.clamp(1, MAX_FORECAST_DAYS);
        let url = build_hourly_url(
            &self.base_url,
            coords,
            &self.config.hourly_fields,
            forecast_days,
            &self.config.timezone,
        );

        logging::debug(DataSource::OpenMeteo, Some(location), &format!("GET {}", url));
        let payload = fetch_json_with_retry(&self.fetcher, &self.sleeper, &url, &self.policy)?;
        let readings = parse_hourly_response(location, payload)?;
        logging::debug(
            DataSource::OpenMeteo,
            Some(location),
            &format!("{} hourly readings over {} day(s)", readings.len(), forecast_days),
        );
        Ok(readings)
    }

    /// Daily rollups of the hourly series.
    pub fn daily_summaries(&self, location: &str, days: u32) -> Result<Vec<DailySummary>, AqError> {
        let hourly = self.assemble_hourly_readings(location, days)?;
        Ok(aggregate_daily(&hourly))
    }
}
