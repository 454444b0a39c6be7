/// Labeled numeric series for chart renderers.
///
/// The renderer is external; these are plain records it can draw however it
/// likes. Point labels are display strings (dates or "HH:MM"), values are the
/// raw numbers.

use serde::Serialize;

use crate::model::{DailySummary, Pollutant, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// Per-point colors, parallel to `points`; empty for single-color series.
    pub colors: Vec<&'static str>,
    pub points: Vec<SeriesPoint>,
}

/// Daily index series, colored by each day's category.
pub fn daily_index_series(location: &str, summaries: &[DailySummary]) -> ChartSeries {
    ChartSeries {
        name: format!("{} AQI", location),
        colors: summaries.iter().map(|s| s.category.color()).collect(),
        points: summaries
            .iter()
            .map(|s| SeriesPoint {
                label: s.date.format("%Y-%m-%d").to_string(),
                value: s.average_index_value as f64,
            })
            .collect(),
    }
}

/// One pollutant's hourly concentrations. Hours that do not report the
/// pollutant are left out rather than drawn as zero.
pub fn hourly_pollutant_series(location: &str, readings: &[Reading], pollutant: Pollutant) -> ChartSeries {
    ChartSeries {
        name: format!("{} {}", location, pollutant.label()),
        colors: Vec::new(),
        points: readings
            .iter()
            .filter_map(|r| {
                r.concentration(pollutant).map(|value| SeriesPoint {
                    label: r.timestamp.format("%m-%d %H:%M").to_string(),
                    value,
                })
            })
            .collect(),
    }
}

/// Current index for several locations, one point per reading, for the
/// overview bar chart.
pub fn location_comparison_series(readings: &[Reading]) -> ChartSeries {
    ChartSeries {
        name: "Current AQI".to_string(),
        colors: readings.iter().map(|r| r.category.color()).collect(),
        points: readings
            .iter()
            .map(|r| SeriesPoint {
                label: r.location.clone(),
                value: r.index_value as f64,
            })
            .collect(),
    }
}
