/// Breakpoint tables for concentration → index conversion.
///
/// Each table is the US EPA piecewise-linear mapping for one pollutant.
/// Entries are ascending and contiguous: every entry's low bound equals the
/// previous entry's high bound plus the table granularity, so a value that
/// has been truncated to the table's precision always lands in exactly one
/// entry.
///
/// Sources:
///   - EPA Technical Assistance Document for the Reporting of Daily Air
///     Quality (AQI), 2012 PM2.5 breakpoints.

use crate::model::Pollutant;

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// One row of a breakpoint table. Both ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub concentration_low: f64,
    pub concentration_high: f64,
    pub index_low: u16,
    pub index_high: u16,
}

impl Breakpoint {
    pub fn contains(&self, concentration: f64) -> bool {
        concentration >= self.concentration_low && concentration <= self.concentration_high
    }
}

#[derive(Debug)]
pub struct BreakpointTable {
    pub pollutant: Pollutant,
    /// Step between one entry's high bound and the next entry's low bound.
    pub granularity: f64,
    pub entries: &'static [Breakpoint],
}

impl BreakpointTable {
    /// Highest index the table can produce; concentrations above the last
    /// entry clamp to this.
    pub fn max_index(&self) -> u16 {
        self.entries.last().map(|bp| bp.index_high).unwrap_or(0)
    }

    pub fn lowest_concentration(&self) -> f64 {
        self.entries.first().map(|bp| bp.concentration_low).unwrap_or(0.0)
    }

    pub fn highest_concentration(&self) -> f64 {
        self.entries.last().map(|bp| bp.concentration_high).unwrap_or(0.0)
    }
}

const fn bp(concentration_low: f64, concentration_high: f64, index_low: u16, index_high: u16) -> Breakpoint {
    Breakpoint {
        concentration_low,
        concentration_high,
        index_low,
        index_high,
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// PM2.5, 24-hour, μg/m³ at 0.1 precision.
pub static PM2_5_TABLE: BreakpointTable = BreakpointTable {
    pollutant: Pollutant::Pm2_5,
    granularity: 0.1,
    entries: &[
        bp(0.0, 12.0, 0, 50),      // Good
        bp(12.1, 35.4, 51, 100),   // Moderate
        bp(35.5, 55.4, 101, 150),  // Unhealthy for Sensitive Groups
        bp(55.5, 150.4, 151, 200), // Unhealthy
        bp(150.5, 250.4, 201, 300), // Very Unhealthy
        bp(250.5, 350.4, 301, 400), // Hazardous
        bp(350.5, 500.4, 401, 500), // Hazardous
    ],
};

/// PM10, 24-hour, μg/m³ at integer precision.
pub static PM10_TABLE: BreakpointTable = BreakpointTable {
    pollutant: Pollutant::Pm10,
    granularity: 1.0,
    entries: &[
        bp(0.0, 54.0, 0, 50),
        bp(55.0, 154.0, 51, 100),
        bp(155.0, 254.0, 101, 150),
        bp(255.0, 354.0, 151, 200),
        bp(355.0, 424.0, 201, 300),
        bp(425.0, 504.0, 301, 400),
        bp(505.0, 604.0, 401, 500),
    ],
};

/// Returns the breakpoint table for a pollutant, if one is defined.
pub fn table_for(pollutant: Pollutant) -> Option<&'static BreakpointTable> {
    match pollutant {
        Pollutant::Pm2_5 => Some(&PM2_5_TABLE),
        Pollutant::Pm10 => Some(&PM10_TABLE),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
