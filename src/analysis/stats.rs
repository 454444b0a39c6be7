/// Descriptive statistics over daily summaries.
///
/// Feeds the dashboard's pollutant breakdown and month-by-month views.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::model::{DailySummary, Pollutant};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1 denominator); `None` with fewer
    /// than two samples.
    pub std_dev: Option<f64>,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// "YYYY-MM"
    pub month: String,
    pub average_index: f64,
    pub days: usize,
}

fn describe(values: &[f64]) -> Option<PollutantStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (values.len() > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(PollutantStats {
        mean,
        min,
        max,
        std_dev,
        samples: values.len(),
    })
}

/// Per-pollutant statistics over the daily averages. Pollutants with no
/// values are omitted.
pub fn pollutant_stats(summaries: &[DailySummary]) -> BTreeMap<Pollutant, PollutantStats> {
    let mut columns: BTreeMap<Pollutant, Vec<f64>> = BTreeMap::new();
    for summary in summaries {
        for (pollutant, value) in &summary.averaged_concentrations {
            columns.entry(*pollutant).or_default().push(*value);
        }
    }
    columns
        .into_iter()
        .filter_map(|(pollutant, values)| describe(&values).map(|s| (pollutant, s)))
        .collect()
}

/// Mean daily index per calendar month, ascending.
pub fn monthly_averages(summaries: &[DailySummary]) -> Vec<MonthlyAverage> {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for summary in summaries {
        let key = (summary.date.year(), summary.date.month());
        let entry = months.entry(key).or_insert((0.0, 0));
        entry.0 += summary.average_index_value as f64;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (sum, days))| MonthlyAverage {
            month: format!("{:04}-{:02}", year, month),
            average_index: sum / days as f64,
            days,
        })
        .collect()
}
