/// Daily rollups of hourly readings.
///
/// Readings are grouped by the date portion of their (already local)
/// timestamp. No timezone conversion happens here; the upstream request's
/// timezone decides which calendar day an hour belongs to.
///
/// Within a day every field is averaged independently: a pollutant missing
/// from some hours is averaged over the hours that report it. The category
/// is recomputed from the averaged index (average-then-classify).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::alert::categories::classify;
use crate::logging::{self, DataSource};
use crate::model::{DailySummary, Pollutant, Reading};

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Default)]
struct DayAccumulator {
    index_sum: f64,
    count: usize,
    sums: BTreeMap<Pollutant, (f64, usize)>,
}

impl DayAccumulator {
    fn add(&mut self, reading: &Reading) {
        self.index_sum += reading.index_value as f64;
        self.count += 1;
        for (pollutant, value) in &reading.concentrations {
            let entry = self.sums.entry(*pollutant).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    fn finish(self, date: NaiveDate) -> DailySummary {
        let average_index = (self.index_sum / self.count as f64).round();
        let average_index_value = average_index.clamp(0.0, u16::MAX as f64) as u16;
        let averaged_concentrations = self
            .sums
            .into_iter()
            .map(|(pollutant, (sum, n))| (pollutant, round1(sum / n as f64)))
            .collect();

        DailySummary {
            date,
            averaged_concentrations,
            average_index_value,
            category: classify(average_index_value),
            reading_count: self.count,
        }
    }
}

/// Groups readings by calendar date and averages each group.
///
/// Input order does not matter. Output is ascending by date and contains
/// only dates that have at least one reading.
pub fn aggregate_daily(hourly_readings: &[Reading]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for reading in hourly_readings {
        days.entry(reading.timestamp.date()).or_default().add(reading);
    }

    let summaries: Vec<DailySummary> = days
        .into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect();

    logging::debug(
        DataSource::Aggregator,
        None,
        &format!(
            "aggregated {} readings into {} daily summaries",
            hourly_readings.len(),
            summaries.len()
        ),
    );
    summaries
}
