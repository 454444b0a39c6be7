/// Core data types for the air-quality monitoring service.
///
/// This module defines the shared domain model imported by all other modules:
/// pollutants, readings and daily summaries, plus the error types for
/// fetching, configuration and the historical dataset.
///
/// Records here are plain values: they are built once by the ingest and
/// analysis layers and never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::alert::categories::AqiCategory;

// ---------------------------------------------------------------------------
// Upstream field names
// ---------------------------------------------------------------------------

/// Open-Meteo field for fine particulate matter (PM2.5), in μg/m³.
pub const FIELD_PM2_5: &str = "pm2_5";

/// Open-Meteo field for coarse particulate matter (PM10), in μg/m³.
pub const FIELD_PM10: &str = "pm10";

pub const FIELD_US_AQI: &str = "us_aqi";
pub const FIELD_EUROPEAN_AQI: &str = "european_aqi";
pub const FIELD_UV_INDEX: &str = "uv_index";

/// Unit reported by Open-Meteo for every pollutant concentration.
pub const CONCENTRATION_UNIT: &str = "μg/m³";

// ---------------------------------------------------------------------------
// Pollutants
// ---------------------------------------------------------------------------

/// Pollutants reported by the upstream feed.
///
/// Ordering follows the declaration order, which keeps `BTreeMap` output
/// stable for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    #[serde(rename = "pm2_5")]
    Pm2_5,
    Pm10,
    CarbonMonoxide,
    NitrogenDioxide,
    SulphurDioxide,
    Ozone,
    Dust,
}

impl Pollutant {
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm2_5,
        Pollutant::Pm10,
        Pollutant::CarbonMonoxide,
        Pollutant::NitrogenDioxide,
        Pollutant::SulphurDioxide,
        Pollutant::Ozone,
        Pollutant::Dust,
    ];

    /// Field name used in Open-Meteo request parameters and responses.
    pub fn api_field(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => FIELD_PM2_5,
            Pollutant::Pm10 => FIELD_PM10,
            Pollutant::CarbonMonoxide => "carbon_monoxide",
            Pollutant::NitrogenDioxide => "nitrogen_dioxide",
            Pollutant::SulphurDioxide => "sulphur_dioxide",
            Pollutant::Ozone => "ozone",
            Pollutant::Dust => "dust",
        }
    }

    pub fn from_api_field(field: &str) -> Option<Pollutant> {
        Pollutant::ALL.into_iter().find(|p| p.api_field() == field)
    }

    /// Short chart label, e.g. "PM2.5" or "NO₂".
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::CarbonMonoxide => "CO",
            Pollutant::NitrogenDioxide => "NO₂",
            Pollutant::SulphurDioxide => "SO₂",
            Pollutant::Ozone => "O₃",
            Pollutant::Dust => "Dust",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Index values computed upstream and passed through untouched.
///
/// These are informational only; classification always uses the locally
/// computed PM2.5 index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportedIndices {
    pub us_aqi: Option<f64>,
    pub european_aqi: Option<f64>,
    pub uv_index: Option<f64>,
}

/// A single air-quality sample for one location.
///
/// Built by the ingest layer from one upstream sample (either the `current`
/// block or one row of the `hourly` series).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub location: String,
    /// Local wall-clock time in the requested timezone, as reported upstream.
    pub timestamp: NaiveDateTime,
    pub concentrations: BTreeMap<Pollutant, f64>,
    pub index_value: u16,
    pub category: AqiCategory,
    pub reported: ReportedIndices,
}

impl Reading {
    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        self.concentrations.get(&pollutant).copied()
    }
}

/// Averages over all readings that fall on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Per-pollutant means, rounded to one decimal place.
    pub averaged_concentrations: BTreeMap<Pollutant, f64>,
    /// Mean of the hourly index values, rounded to the nearest integer.
    pub average_index_value: u16,
    pub category: AqiCategory,
    pub reading_count: usize,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A single failed attempt against the upstream feed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    Request(String),
    /// Non-2xx HTTP response.
    Status(u16),
    /// A response arrived but its body was not readable JSON.
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "request failed: {}", msg),
            TransportError::Status(code) => write!(f, "HTTP error: {}", code),
            TransportError::Body(msg) => write!(f, "unreadable body: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors that can arise when fetching or assembling air-quality data.
#[derive(Debug, Clone, PartialEq)]
pub enum AqError {
    /// The location is not present in the coordinate table. Never retried.
    LocationNotFound(String),
    /// Every attempt failed; carries the last transport failure.
    Fetch {
        url: String,
        attempts: u32,
        cause: TransportError,
    },
    /// The payload arrived but lacks a field we depend on. Never retried.
    MalformedResponse { location: String, detail: String },
}

impl fmt::Display for AqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqError::LocationNotFound(location) => write!(f, "Location not found: {}", location),
            AqError::Fetch { url, attempts, cause } => {
                write!(f, "Fetch failed after {} attempt(s) for {}: {}", attempts, url, cause)
            }
            AqError::MalformedResponse { location, detail } => {
                write!(f, "Malformed response for {}: {}", location, detail)
            }
        }
    }
}

impl std::error::Error for AqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AqError::Fetch { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Problems loading or validating `ServiceConfig`.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config read error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Problems reading the historical city/day dataset.
#[derive(Debug)]
pub enum DatasetError {
    /// The file could not be opened or a row could not be decoded.
    Csv { path: String, source: csv::Error },
    /// The file decoded but held no usable rows.
    Empty(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Csv { path, source } => write!(f, "Dataset error in {}: {}", path, source),
            DatasetError::Empty(path) => write!(f, "Dataset {} has no usable rows", path),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Csv { source, .. } => Some(source),
            DatasetError::Empty(_) => None,
        }
    }
}
