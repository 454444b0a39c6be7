//! Historical city/day dataset.
//!
//! Reads the bundled `city_day.csv` sample dataset (one row per city per
//! day, columns `City,Date,PM2.5,PM10,NO,NO2,...,AQI,AQI_Bucket`) into
//! per-city `DailySummary` records, ascending by date. Columns we do not
//! model are ignored and empty cells are treated as missing.
//!
//! Concentrations are carried in the dataset's own units. The row's `AQI`
//! column is used as the day's index when present; otherwise the index is
//! computed from PM2.5. Rows with neither are skipped.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::alert::categories::classify;
use crate::analysis::index::pm25_index;
use crate::logging::{self, DataSource};
use crate::model::{AqError, DailySummary, DatasetError, Pollutant};

/// Default location of the bundled dataset, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "./datasets/city_day.csv";

// ---------------------------------------------------------------------------
// CSV rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CityDayRow {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "PM2.5")]
    pm2_5: Option<f64>,
    #[serde(rename = "PM10")]
    pm10: Option<f64>,
    #[serde(rename = "NO2")]
    no2: Option<f64>,
    #[serde(rename = "CO")]
    co: Option<f64>,
    #[serde(rename = "SO2")]
    so2: Option<f64>,
    #[serde(rename = "O3")]
    o3: Option<f64>,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

impl CityDayRow {
    fn into_summary(self) -> Option<(String, DailySummary)> {
        let index = match (self.aqi, self.pm2_5) {
            (Some(aqi), _) if aqi.is_finite() && aqi >= 0.0 => aqi.round().min(u16::MAX as f64) as u16,
            (_, Some(pm25)) => pm25_index(pm25),
            _ => return None,
        };

        let averaged_concentrations: BTreeMap<Pollutant, f64> = [
            (Pollutant::Pm2_5, self.pm2_5),
            (Pollutant::Pm10, self.pm10),
            (Pollutant::NitrogenDioxide, self.no2),
            (Pollutant::CarbonMonoxide, self.co),
            (Pollutant::SulphurDioxide, self.so2),
            (Pollutant::Ozone, self.o3),
        ]
        .into_iter()
        .filter_map(|(pollutant, value)| value.map(|v| (pollutant, v)))
        .collect();

        let summary = DailySummary {
            date: self.date,
            averaged_concentrations,
            average_index_value: index,
            category: classify(index),
            reading_count: 1,
        };
        Some((self.city, summary))
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// Most recent day on record for a city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityLatest<'a> {
    pub city: &'a str,
    #[serde(flatten)]
    pub summary: &'a DailySummary,
}

/// Whole-dataset figures across every city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub cities_count: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub average_index: f64,
    pub max_index: u16,
    pub min_index: u16,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct HistoricalDataset {
    cities: BTreeMap<String, Vec<DailySummary>>,
    skipped_rows: usize,
}

impl HistoricalDataset {
    /// Reads the dataset at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let reader = csv::Reader::from_path(path).map_err(|e| DatasetError::Csv {
            path: display.clone(),
            source: e,
        })?;
        let dataset = Self::read_rows(&display, reader)?;

        logging::info(
            DataSource::Dataset,
            None,
            &format!(
                "Loaded {} records for {} cities from {}",
                dataset.record_count(),
                dataset.cities.len(),
                display
            ),
        );
        if dataset.skipped_rows > 0 {
            logging::warn(
                DataSource::Dataset,
                None,
                &format!("Skipped {} rows with neither AQI nor PM2.5", dataset.skipped_rows),
            );
        }
        Ok(dataset)
    }

    /// Reads CSV text from any reader; `source` names it in errors.
    pub fn from_reader<R: io::Read>(source: &str, reader: R) -> Result<Self, DatasetError> {
        Self::read_rows(source, csv::Reader::from_reader(reader))
    }

    fn read_rows<R: io::Read>(source: &str, mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let mut dataset = HistoricalDataset::default();

        for result in reader.deserialize() {
            let row: CityDayRow = result.map_err(|e| DatasetError::Csv {
                path: source.to_string(),
                source: e,
            })?;
            match row.into_summary() {
                Some((city, summary)) => dataset.cities.entry(city).or_default().push(summary),
                None => dataset.skipped_rows += 1,
            }
        }

        if dataset.cities.is_empty() {
            return Err(DatasetError::Empty(source.to_string()));
        }
        for days in dataset.cities.values_mut() {
            days.sort_by_key(|d| d.date);
        }
        Ok(dataset)
    }

    /// City names, sorted.
    pub fn cities(&self) -> Vec<&str> {
        self.cities.keys().map(String::as_str).collect()
    }

    pub fn record_count(&self) -> usize {
        self.cities.values().map(Vec::len).sum()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Days on record for `city` within `[start, end]` (either bound may be
    /// open), ascending. A range that matches nothing is an empty slice.
    pub fn city_days(
        &self,
        city: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<&[DailySummary], AqError> {
        let days = self
            .cities
            .get(city)
            .ok_or_else(|| AqError::LocationNotFound(city.to_string()))?;

        let from = start.map_or(0, |s| days.partition_point(|d| d.date < s));
        let to = end.map_or(days.len(), |e| days.partition_point(|d| d.date <= e));
        if to <= from {
            return Ok(&[]);
        }
        Ok(&days[from..to])
    }

    pub fn latest(&self, city: &str) -> Result<CityLatest<'_>, AqError> {
        let (name, days) = self
            .cities
            .get_key_value(city)
            .ok_or_else(|| AqError::LocationNotFound(city.to_string()))?;
        let summary = days
            .last()
            .ok_or_else(|| AqError::LocationNotFound(city.to_string()))?;
        Ok(CityLatest { city: name, summary })
    }

    /// Latest day for each requested city that the dataset knows, in request
    /// order. Unknown cities are left out.
    pub fn compare(&self, cities: &[String]) -> Vec<CityLatest<'_>> {
        cities.iter().filter_map(|c| self.latest(c).ok()).collect()
    }

    pub fn overview(&self) -> Option<DatasetOverview> {
        let all = || self.cities.values().flatten();

        let start = all().map(|d| d.date).min()?;
        let end = all().map(|d| d.date).max()?;
        let total_records = self.record_count();
        let index_sum: f64 = all().map(|d| d.average_index_value as f64).sum();

        Some(DatasetOverview {
            total_records,
            cities_count: self.cities.len(),
            start,
            end,
            average_index: index_sum / total_records as f64,
            max_index: all().map(|d| d.average_index_value).max()?,
            min_index: all().map(|d| d.average_index_value).min()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::categories::AqiCategory;

    const SAMPLE: &str = "\
City,Date,PM2.5,PM10,NO,NO2,NOx,NH3,CO,SO2,O3,Benzene,Toluene,Xylene,AQI,AQI_Bucket
Delhi,2020-01-02,180.2,290.1,10.0,55.3,60.0,40.0,1.9,15.2,30.1,5.0,20.0,,401.0,Severe
Ahmedabad,2015-01-01,,,0.92,18.22,17.15,,0.92,27.64,133.36,0.0,0.02,0.0,,
Delhi,2020-01-01,150.0,250.0,9.0,50.0,55.0,35.0,1.5,12.0,28.0,4.0,18.0,,350.0,Very Poor
Mumbai,2020-01-01,30.0,80.0,,,,,,,,,,,,
Delhi,2020-02-15,60.0,120.0,,,,,,,,,,,150.0,Moderate
";

    fn sample() -> HistoricalDataset {
        HistoricalDataset::from_reader("sample", SAMPLE.as_bytes()).expect("sample dataset parses")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_rows_become_sorted_daily_summaries() {
        let dataset = sample();
        assert_eq!(dataset.cities(), vec!["Delhi", "Mumbai"]);
        assert_eq!(dataset.record_count(), 4);
        // Ahmedabad has neither AQI nor PM2.5.
        assert_eq!(dataset.skipped_rows(), 1);

        let delhi = dataset.city_days("Delhi", None, None).unwrap();
        let dates: Vec<_> = delhi.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2020-01-01"), date("2020-01-02"), date("2020-02-15")]);
        assert_eq!(delhi[0].average_index_value, 350);
        assert_eq!(delhi[0].category, AqiCategory::Hazardous);
        assert_eq!(delhi[0].averaged_concentrations[&Pollutant::NitrogenDioxide], 50.0);
        assert_eq!(delhi[0].reading_count, 1);
    }

    #[test]
    fn test_missing_aqi_falls_back_to_pm25_index() {
        let dataset = sample();
        let mumbai = dataset.city_days("Mumbai", None, None).unwrap();
        assert_eq!(mumbai[0].average_index_value, pm25_index(30.0));
        assert_eq!(mumbai[0].averaged_concentrations.len(), 2, "empty cells are missing, not zero");
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let dataset = sample();
        let january = dataset
            .city_days("Delhi", Some(date("2020-01-02")), Some(date("2020-01-31")))
            .unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].date, date("2020-01-02"));

        let from_feb = dataset.city_days("Delhi", Some(date("2020-02-15")), None).unwrap();
        assert_eq!(from_feb.len(), 1);

        let inverted = dataset
            .city_days("Delhi", Some(date("2020-03-01")), Some(date("2020-01-01")))
            .unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_unknown_city_is_location_not_found() {
        let dataset = sample();
        assert_eq!(
            dataset.city_days("Atlantis", None, None),
            Err(AqError::LocationNotFound("Atlantis".to_string()))
        );
        assert!(dataset.latest("Atlantis").is_err());
    }

    #[test]
    fn test_latest_and_compare() {
        let dataset = sample();
        let latest = dataset.latest("Delhi").unwrap();
        assert_eq!(latest.city, "Delhi");
        assert_eq!(latest.summary.date, date("2020-02-15"));

        let compared = dataset.compare(&["Mumbai".to_string(), "Atlantis".to_string(), "Delhi".to_string()]);
        let names: Vec<_> = compared.iter().map(|c| c.city).collect();
        assert_eq!(names, vec!["Mumbai", "Delhi"]);

        let json = serde_json::to_value(&latest).unwrap();
        assert_eq!(json["city"], "Delhi");
        assert_eq!(json["average_index_value"], 150);
    }

    #[test]
    fn test_overview_spans_all_cities() {
        let overview = sample().overview().expect("non-empty dataset");
        assert_eq!(overview.total_records, 4);
        assert_eq!(overview.cities_count, 2);
        assert_eq!(overview.start, date("2020-01-01"));
        assert_eq!(overview.end, date("2020-02-15"));
        assert_eq!(overview.max_index, 401);
        assert_eq!(overview.min_index, pm25_index(30.0));
    }

    #[test]
    fn test_header_only_file_is_empty_error() {
        let result = HistoricalDataset::from_reader("blank", "City,Date,PM2.5,AQI\n".as_bytes());
        assert!(matches!(result, Err(DatasetError::Empty(_))));
    }

    #[test]
    fn test_bad_date_is_csv_error() {
        let text = "City,Date,PM2.5,AQI\nDelhi,yesterday,10.0,40\n";
        let result = HistoricalDataset::from_reader("bad", text.as_bytes());
        assert!(matches!(result, Err(DatasetError::Csv { .. })));
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let result = HistoricalDataset::load("./no-such-dir/city_day.csv");
        assert!(matches!(result, Err(DatasetError::Csv { .. })));
    }
}
