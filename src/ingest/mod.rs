//! Upstream data acquisition: retrying JSON transport, the Open-Meteo
//! request/response mapping, and the bundled historical dataset.

pub mod history;
pub mod openmeteo;
pub mod retry;
