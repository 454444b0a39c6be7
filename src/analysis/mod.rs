/// Pure computations over readings for the air-quality monitoring service.
///
/// Nothing in here performs I/O or suspends; every function is a plain
/// transformation of values already in hand.
///
/// Submodules:
/// - `index` : concentration → index via breakpoint tables.
/// - `daily` : hourly readings → per-day averaged summaries.
/// - `stats` : pollutant statistics and monthly averages over summaries.
/// - `series`: labeled numeric series for chart renderers.

pub mod daily;
pub mod index;
pub mod series;
pub mod stats;
