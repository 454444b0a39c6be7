/// Concentration → index conversion.
///
/// Implements the EPA piecewise-linear formula over a `BreakpointTable`:
///
///   I = (I_high - I_low) / (C_high - C_low) * (C - C_low) + I_low
///
/// rounded to the nearest integer, halves away from zero.

use std::collections::BTreeMap;

use crate::breakpoints::{table_for, BreakpointTable, PM2_5_TABLE};
use crate::model::Pollutant;

/// Computes the index for `concentration` against `table`.
///
/// - Below the table's lowest bound (including negative and NaN input): 0.
/// - Above the table's highest bound: the table's maximum index.
/// - Exactly on an entry's high bound: that entry's `index_high`.
/// - Inside the granularity gap between two entries (e.g. 12.05 for PM2.5):
///   assigned to the upper entry and clamped to its `index_low`. The web
///   dashboard's calculator returns 0 for these instead.
pub fn compute_index(table: &BreakpointTable, concentration: f64) -> u16 {
    if concentration.is_nan() || concentration < table.lowest_concentration() {
        return 0;
    }
    if concentration > table.highest_concentration() {
        return table.max_index();
    }

    let Some(bp) = table
        .entries
        .iter()
        .find(|bp| concentration <= bp.concentration_high)
    else {
        return table.max_index();
    };

    let slope = (bp.index_high - bp.index_low) as f64 / (bp.concentration_high - bp.concentration_low);
    let index = slope * (concentration - bp.concentration_low) + bp.index_low as f64;
    let rounded = index.round().clamp(bp.index_low as f64, bp.index_high as f64);
    rounded as u16
}

/// Index for a pollutant, or `None` when no breakpoint table is defined
/// for it.
pub fn index_for(pollutant: Pollutant, concentration: f64) -> Option<u16> {
    table_for(pollutant).map(|table| compute_index(table, concentration))
}

/// Per-pollutant sub-indices for every concentration that has a table.
/// Classification still uses PM2.5 alone; these are reported alongside.
pub fn sub_indices(concentrations: &BTreeMap<Pollutant, f64>) -> BTreeMap<Pollutant, u16> {
    concentrations
        .iter()
        .filter_map(|(pollutant, value)| index_for(*pollutant, *value).map(|i| (*pollutant, i)))
        .collect()
}

/// Index for the primary pollutant (PM2.5).
pub fn pm25_index(concentration: f64) -> u16 {
    compute_index(&PM2_5_TABLE, concentration)
}
