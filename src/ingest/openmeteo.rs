/// Open-Meteo Air Quality API Client
///
/// Builds request URLs and turns response payloads into `Reading`s.
///
/// API Documentation: https://open-meteo.com/en/docs/air-quality-api
///
/// Two response shapes are consumed:
/// - `current`: one object with `time` plus one number per requested field.
/// - `hourly`: a `time` array plus one array per requested field, all the
///   same length and index-aligned with `time`.
///
/// Timestamps come back as local wall-clock time in the requested timezone
/// with no offset (e.g. "2024-05-01T13:00") and are kept that way.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use reqwest::Url;
use serde::Deserialize;

use crate::alert::categories::classify;
use crate::analysis::index::pm25_index;
use crate::locations::Location;
use crate::model::{
    AqError, Pollutant, Reading, ReportedIndices, FIELD_EUROPEAN_AQI, FIELD_PM2_5, FIELD_US_AQI,
    FIELD_UV_INDEX,
};

// ============================================================================
// Open-Meteo Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HourlyPayload {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

// ============================================================================
// URL Construction
// ============================================================================

/// URL for the latest sample at a location.
pub fn build_current_url(base: &Url, location: &Location, fields: &[String], timezone: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("latitude", &location.latitude.to_string())
        .append_pair("longitude", &location.longitude.to_string())
        .append_pair("current", &fields.join(","))
        .append_pair("timezone", timezone);
    url.into()
}

/// URL for the hourly series covering `forecast_days` days.
pub fn build_hourly_url(
    base: &Url,
    location: &Location,
    fields: &[String],
    forecast_days: u32,
    timezone: &str,
) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("latitude", &location.latitude.to_string())
        .append_pair("longitude", &location.longitude.to_string())
        .append_pair("hourly", &fields.join(","))
        .append_pair("forecast_days", &forecast_days.to_string())
        .append_pair("timezone", timezone);
    url.into()
}

// ============================================================================
// Response Parsing
// ============================================================================

fn malformed(location: &str, detail: impl Into<String>) -> AqError {
    AqError::MalformedResponse {
        location: location.to_string(),
        detail: detail.into(),
    }
}

/// Parses an Open-Meteo local timestamp ("YYYY-MM-DDTHH:MM", seconds optional).
pub fn parse_local_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Builds a reading from per-field values, computing the PM2.5 index and
/// its category.
fn reading_from_fields<'a>(
    location: &str,
    timestamp: NaiveDateTime,
    pm25: f64,
    fields: impl Iterator<Item = (&'a str, Option<f64>)>,
) -> Reading {
    let mut concentrations = BTreeMap::new();
    let mut reported = ReportedIndices::default();

    for (name, value) in fields {
        let Some(value) = value else { continue };
        if let Some(pollutant) = Pollutant::from_api_field(name) {
            concentrations.insert(pollutant, value);
            continue;
        }
        match name {
            FIELD_US_AQI => reported.us_aqi = Some(value),
            FIELD_EUROPEAN_AQI => reported.european_aqi = Some(value),
            FIELD_UV_INDEX => reported.uv_index = Some(value),
            _ => {}
        }
    }
    concentrations.insert(Pollutant::Pm2_5, pm25);

    let index_value = pm25_index(pm25);
    Reading {
        location: location.to_string(),
        timestamp,
        concentrations,
        index_value,
        category: classify(index_value),
        reported,
    }
}

/// Parses a `current` response into a single reading.
///
/// Fails with `MalformedResponse` if the `current` block, its `time`, or its
/// PM2.5 value is missing. Other absent pollutants are simply left out of
/// the reading.
pub fn parse_current_response(location: &str, payload: serde_json::Value) -> Result<Reading, AqError> {
    let payload: CurrentPayload =
        serde_json::from_value(payload).map_err(|e| malformed(location, e.to_string()))?;
    let current = payload
        .current
        .ok_or_else(|| malformed(location, "missing 'current' block"))?;

    let time = current
        .time
        .as_deref()
        .ok_or_else(|| malformed(location, "missing current.time"))?;
    let timestamp = parse_local_timestamp(time)
        .ok_or_else(|| malformed(location, format!("unparseable current.time '{}'", time)))?;

    let pm25 = current
        .fields
        .get(FIELD_PM2_5)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| malformed(location, "missing current.pm2_5"))?;

    let fields = current
        .fields
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_f64()));

    Ok(reading_from_fields(location, timestamp, pm25, fields))
}

/// Parses an `hourly` response into one reading per timestamp.
///
/// Rows whose PM2.5 value is null are skipped, since no index can be
/// computed for them. A series whose length differs from `time`, a
/// non-array series, or an unparseable timestamp is a `MalformedResponse`.
pub fn parse_hourly_response(location: &str, payload: serde_json::Value) -> Result<Vec<Reading>, AqError> {
    let payload: HourlyPayload =
        serde_json::from_value(payload).map_err(|e| malformed(location, e.to_string()))?;
    let hourly = payload
        .hourly
        .ok_or_else(|| malformed(location, "missing 'hourly' block"))?;

    let rows = hourly.time.len();
    let mut columns: Vec<(&str, &Vec<serde_json::Value>)> = Vec::with_capacity(hourly.series.len());
    for (name, values) in &hourly.series {
        let values = values
            .as_array()
            .ok_or_else(|| malformed(location, format!("hourly.{} is not an array", name)))?;
        if values.len() != rows {
            return Err(malformed(
                location,
                format!("hourly.{} has {} values, expected {}", name, values.len(), rows),
            ));
        }
        columns.push((name.as_str(), values));
    }

    let pm25_column = columns
        .iter()
        .find(|(name, _)| *name == FIELD_PM2_5)
        .map(|(_, values)| *values)
        .ok_or_else(|| malformed(location, "missing hourly.pm2_5"))?;

    let mut readings = Vec::with_capacity(rows);
    for (row, time) in hourly.time.iter().enumerate() {
        let timestamp = parse_local_timestamp(time)
            .ok_or_else(|| malformed(location, format!("unparseable hourly.time '{}'", time)))?;

        let Some(pm25) = pm25_column[row].as_f64() else {
            continue;
        };

        let fields = columns.iter().map(|(name, values)| (*name, values[row].as_f64()));
        readings.push(reading_from_fields(location, timestamp, pm25, fields));
    }

    Ok(readings)
}

// ============================================================================
// Tests
// ============================================================================
