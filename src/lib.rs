//! Air-quality monitoring service.
//!
//! Converts raw pollutant concentrations from the Open-Meteo air-quality
//! feed into EPA index values and severity categories, rolls hourly series
//! up into daily summaries, and collects readings for many locations at once
//! while tolerating per-location failures.

pub mod alert;
pub mod analysis;
pub mod assembler;
pub mod breakpoints;
pub mod collect;
pub mod config;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod summary;
