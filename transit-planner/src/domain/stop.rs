//! Stop types.

use std::fmt;
use std::sync::Arc;

/// Dense index of a stop inside a [`TimetableGraph`](crate::timetable::TimetableGraph).
///
/// Ids are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

impl StopId {
    /// Returns the id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stop#{}", self.0)
    }
}

/// A named location where trips begin or end.
///
/// The name is the identity key: a timetable holds exactly one `Stop` per
/// distinct name. Coordinates are WGS84 degrees and only feed heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    name: Arc<str>,
    lat: f64,
    lon: f64,
}

impl Stop {
    /// Create a stop.
    pub fn new(name: impl Into<Arc<str>>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    /// Returns the stop name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a shared handle to the stop name.
    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Whether both coordinates are within `tolerance` degrees of `(lat, lon)`.
    pub fn is_near(&self, lat: f64, lon: f64, tolerance: f64) -> bool {
        (self.lat - lat).abs() <= tolerance && (self.lon - lon).abs() <= tolerance
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
