//! Typed timetable rows.

use crate::domain::TimeOfDay;

/// One validated timetable record: a single trip between two stops.
///
/// This is the boundary type between whatever reads the timetable and the
/// graph builder. Times are already normalized to a 24-hour clock.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableRow {
    pub trip_id: u64,
    pub operator: String,
    pub line: String,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
    pub origin: String,
    pub destination: String,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub destination_lat: f64,
    pub destination_lon: f64,
}

impl TimetableRow {
    /// Create a row with no operator and zero coordinates.
    pub fn new(
        trip_id: u64,
        line: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: TimeOfDay,
        arrival: TimeOfDay,
    ) -> Self {
        Self {
            trip_id,
            operator: String::new(),
            line: line.into(),
            departure,
            arrival,
            origin: origin.into(),
            destination: destination.into(),
            origin_lat: 0.0,
            origin_lon: 0.0,
            destination_lat: 0.0,
            destination_lon: 0.0,
        }
    }

    /// Set the operating company.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Set origin and destination coordinates as `(lat, lon)` pairs.
    pub fn with_coordinates(mut self, origin: (f64, f64), destination: (f64, f64)) -> Self {
        (self.origin_lat, self.origin_lon) = origin;
        (self.destination_lat, self.destination_lon) = destination;
        self
    }
}
