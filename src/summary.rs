//! Caller-side accounting for a multi-location collection.

use serde::Serialize;

use crate::collect::LocationOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_locations: Vec<String>,
}

impl CollectionSummary {
    pub fn from_outcomes<T, E>(outcomes: &[LocationOutcome<T, E>]) -> Self {
        let failed_locations: Vec<String> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.location.clone())
            .collect();
        Self {
            total: outcomes.len(),
            succeeded: outcomes.len() - failed_locations.len(),
            failed: failed_locations.len(),
            failed_locations,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.succeeded as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

pub fn print_summary(summary: &CollectionSummary) {
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Locations:    {}/{} working  ({} failed)", summary.succeeded, summary.total, summary.failed);
    if !summary.failed_locations.is_empty() {
        eprintln!("Failed:       {}", summary.failed_locations.join(", "));
    }
    eprintln!("Success Rate: {:.1}%", summary.success_rate());
    eprintln!("═══════════════════════════════════════════════════════════");
}
