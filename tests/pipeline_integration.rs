/// Integration tests for the reading pipeline against canned upstream data
///
/// These tests verify:
/// 1. A current payload becomes an indexed, classified Reading
/// 2. Multi-location collection keeps input order under partial failure
/// 3. Hourly payloads roll up into ascending daily summaries
/// 4. Terminal failures reach the caller unchanged
///
/// No network access is needed: a `JsonFetcher` routes requests to fixed
/// payloads by latitude.

use std::sync::Mutex;
use std::time::Duration;

use aqmon_service::alert::categories::AqiCategory;
use aqmon_service::analysis::series::daily_index_series;
use aqmon_service::analysis::stats::pollutant_stats;
use aqmon_service::assembler::ReadingAssembler;
use aqmon_service::collect::collect_current_readings;
use aqmon_service::config::ServiceConfig;
use aqmon_service::ingest::retry::{JsonFetcher, Sleeper};
use aqmon_service::locations::LocationTable;
use aqmon_service::model::{AqError, Pollutant, TransportError};
use aqmon_service::summary::CollectionSummary;

use chrono::NaiveDate;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Routes requests by the latitude in the query string.
struct RoutedFetcher {
    routes: Vec<(&'static str, Result<Value, TransportError>)>,
    requests: Mutex<Vec<String>>,
}

impl RoutedFetcher {
    fn new(routes: Vec<(&'static str, Result<Value, TransportError>)>) -> Self {
        Self {
            routes,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self, latitude: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(&format!("latitude={}", latitude)))
            .count()
    }
}

impl JsonFetcher for RoutedFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.routes
            .iter()
            .find(|(latitude, _)| url.contains(&format!("latitude={}&", latitude)))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(TransportError::Status(404)))
    }
}

#[derive(Default)]
struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

const DELHI_LAT: &str = "28.6139";
const MUMBAI_LAT: &str = "19.076";
const KOLKATA_LAT: &str = "22.5726";

fn current_payload(pm25: f64) -> Value {
    json!({
        "latitude": 28.625,
        "longitude": 77.25,
        "timezone": "Asia/Kolkata",
        "current": {
            "time": "2024-11-05T14:00",
            "interval": 3600,
            "pm10": 180.5,
            "pm2_5": pm25,
            "carbon_monoxide": 1200.0,
            "nitrogen_dioxide": 45.3,
            "sulphur_dioxide": 12.1,
            "ozone": 60.0,
            "dust": 3.0,
            "uv_index": 4.1,
            "european_aqi": 95,
            "us_aqi": 172
        }
    })
}

fn hourly_payload() -> Value {
    json!({
        "hourly": {
            "time": [
                "2024-11-05T22:00", "2024-11-05T23:00",
                "2024-11-06T00:00", "2024-11-06T01:00", "2024-11-06T02:00"
            ],
            "pm2_5": [12.0, 12.0, 55.5, 55.5, null],
            "pm10": [30.0, 32.0, 90.0, 96.0, 99.0],
            "us_aqi": [50, 50, 151, 151, 152]
        }
    })
}

fn assembler(fetcher: RoutedFetcher) -> ReadingAssembler<RoutedFetcher, RecordingSleeper> {
    ReadingAssembler::new(
        fetcher,
        RecordingSleeper::default(),
        LocationTable::builtin(),
        ServiceConfig::default(),
    )
    .expect("default config is valid")
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Current readings
// ---------------------------------------------------------------------------

#[test]
fn test_current_reading_is_indexed_and_classified() {
    let a = assembler(RoutedFetcher::new(vec![(DELHI_LAT, Ok(current_payload(89.4)))]));

    let reading = a.assemble_current_reading("Delhi").expect("Delhi should resolve");

    assert_eq!(reading.location, "Delhi");
    assert_eq!(reading.index_value, 169);
    assert_eq!(reading.category, AqiCategory::Unhealthy);
    assert_eq!(reading.category.level(), 4);
    assert_eq!(reading.concentrations.len(), 7, "all seven pollutants reported");
    assert_eq!(reading.concentration(Pollutant::NitrogenDioxide), Some(45.3));
    assert_eq!(reading.reported.us_aqi, Some(172.0));
}

#[test]
fn test_request_carries_configured_fields_and_timezone() {
    let a = assembler(RoutedFetcher::new(vec![(DELHI_LAT, Ok(current_payload(10.0)))]));
    a.assemble_current_reading("Delhi").expect("should succeed");

    let requests = a.fetcher().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let url = &requests[0];
    assert!(url.starts_with("https://air-quality.open-meteo.com/v1/air-quality?"));
    assert!(url.contains("current=pm10%2Cpm2_5%2C"));
    assert!(url.contains("timezone=Asia%2FKolkata"));
    assert!(a.sleeper().waits.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Multi-location collection
// ---------------------------------------------------------------------------

#[test]
fn test_collection_reports_every_location_in_input_order() {
    let fetcher = RoutedFetcher::new(vec![
        (DELHI_LAT, Ok(current_payload(89.4))),
        (MUMBAI_LAT, Err(TransportError::Status(503))),
        (KOLKATA_LAT, Ok(current_payload(8.0))),
    ]);
    let a = assembler(fetcher);
    let outcomes = collect_current_readings(&a, &names(&["Delhi", "Mumbai", "Kolkata"]));

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].location, "Delhi");
    assert_eq!(outcomes[1].location, "Mumbai");
    assert_eq!(outcomes[2].location, "Kolkata");

    assert_eq!(outcomes[0].result.as_ref().map(|r| r.index_value), Ok(169));
    assert!(matches!(
        outcomes[1].result,
        Err(AqError::Fetch { attempts: 3, cause: TransportError::Status(503), .. })
    ));
    assert_eq!(
        outcomes[2].result.as_ref().map(|r| r.category),
        Ok(AqiCategory::Good)
    );

    let summary = CollectionSummary::from_outcomes(&outcomes);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed_locations, vec!["Mumbai".to_string()]);
}

#[test]
fn test_failing_location_is_retried_with_backoff() {
    let fetcher = RoutedFetcher::new(vec![(MUMBAI_LAT, Err(TransportError::Request("reset".into())))]);
    let a = ReadingAssembler::new(
        fetcher,
        RecordingSleeper::default(),
        LocationTable::builtin(),
        ServiceConfig {
            retry_delay_ms: 250,
            ..ServiceConfig::default()
        },
    )
    .expect("valid config");

    let outcomes = collect_current_readings(&a, &names(&["Mumbai"]));
    assert!(!outcomes[0].is_success());
    assert_eq!(a.fetcher().request_count(MUMBAI_LAT), 3);
    assert_eq!(
        *a.sleeper().waits.lock().unwrap(),
        vec![Duration::from_millis(250), Duration::from_millis(500)]
    );
}

#[test]
fn test_unknown_location_is_reported_not_raised() {
    let a = assembler(RoutedFetcher::new(vec![(DELHI_LAT, Ok(current_payload(20.0)))]));
    let outcomes = collect_current_readings(&a, &names(&["Atlantis", "Delhi"]));

    assert_eq!(
        outcomes[0].result,
        Err(AqError::LocationNotFound("Atlantis".to_string()))
    );
    assert!(outcomes[1].is_success());
}

// ---------------------------------------------------------------------------
// Daily rollups
// ---------------------------------------------------------------------------

#[test]
fn test_hourly_series_rolls_up_by_local_date() {
    let a = assembler(RoutedFetcher::new(vec![(DELHI_LAT, Ok(hourly_payload()))]));

    let summaries = a.daily_summaries("Delhi", 7).expect("hourly payload is valid");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].date, NaiveDate::from_ymd_opt(2024, 11, 5).unwrap());
    assert_eq!(summaries[0].average_index_value, 50);
    assert_eq!(summaries[0].category, AqiCategory::Good);
    assert_eq!(summaries[0].averaged_concentrations[&Pollutant::Pm10], 31.0);

    // The 02:00 row has no PM2.5 and is skipped entirely.
    assert_eq!(summaries[1].date, NaiveDate::from_ymd_opt(2024, 11, 6).unwrap());
    assert_eq!(summaries[1].reading_count, 2);
    assert_eq!(summaries[1].average_index_value, 151);
    assert_eq!(summaries[1].category, AqiCategory::Unhealthy);
    assert_eq!(summaries[1].averaged_concentrations[&Pollutant::Pm10], 93.0);

    let series = daily_index_series("Delhi", &summaries);
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.colors, vec!["#00e400", "#ff0000"]);

    let stats = pollutant_stats(&summaries);
    assert_eq!(stats[&Pollutant::Pm10].max, 93.0);
}

#[test]
fn test_daily_fetch_failure_is_not_masked_as_empty() {
    let a = assembler(RoutedFetcher::new(vec![(DELHI_LAT, Err(TransportError::Status(500)))]));
    let result = a.daily_summaries("Delhi", 3);
    assert!(matches!(result, Err(AqError::Fetch { .. })));
}
