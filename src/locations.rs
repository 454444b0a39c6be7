/// Location registry for the air-quality monitoring service.
///
/// Maps location names to WGS84 coordinates. The built-in registry covers
/// the Indian metro areas the dashboard ships with; `ServiceConfig` may add
/// or override entries through `[[locations]]` tables.
///
/// Lookup is an exact, case-sensitive name match. Nothing beyond presence
/// is validated.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Location metadata
// ---------------------------------------------------------------------------

/// A named point the upstream feed can be queried for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

struct BuiltinLocation {
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

/// Cities available without any configuration, in dashboard display order.
static BUILTIN_LOCATIONS: &[BuiltinLocation] = &[
    BuiltinLocation { name: "Delhi", latitude: 28.6139, longitude: 77.2090 },
    BuiltinLocation { name: "Mumbai", latitude: 19.0760, longitude: 72.8777 },
    BuiltinLocation { name: "Bangalore", latitude: 12.9716, longitude: 77.5946 },
    BuiltinLocation { name: "Jaipur", latitude: 26.9124, longitude: 75.7873 },
    BuiltinLocation { name: "Guwahati", latitude: 26.1445, longitude: 91.7362 },
    BuiltinLocation { name: "Kolkata", latitude: 22.5726, longitude: 88.3639 },
    BuiltinLocation { name: "Chennai", latitude: 13.0827, longitude: 80.2707 },
    BuiltinLocation { name: "Hyderabad", latitude: 17.3850, longitude: 78.4867 },
    BuiltinLocation { name: "Pune", latitude: 18.5204, longitude: 73.8567 },
    BuiltinLocation { name: "Ahmedabad", latitude: 23.0225, longitude: 72.5714 },
];

// ---------------------------------------------------------------------------
// Coordinate table
// ---------------------------------------------------------------------------

/// Ordered coordinate table handed to the ingest layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    /// Table containing only the built-in cities.
    pub fn builtin() -> Self {
        let locations = BUILTIN_LOCATIONS
            .iter()
            .map(|b| Location {
                name: b.name.to_string(),
                latitude: b.latitude,
                longitude: b.longitude,
            })
            .collect();
        Self { locations }
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        let mut table = Self::default();
        table.extend(locations);
        table
    }

    /// Adds entries; an entry whose name already exists replaces it in place.
    pub fn extend(&mut self, locations: impl IntoIterator<Item = Location>) {
        for location in locations {
            match self.locations.iter_mut().find(|l| l.name == location.name) {
                Some(existing) => *existing = location,
                None => self.locations.push(location),
            }
        }
    }

    /// Looks up a location by name. Returns `None` if not found.
    pub fn find(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
