//! Scheduled trip types.
//!
//! A `Trip` is one vehicle departure on one line between two consecutive
//! stops. Trips are the edges of the timetable graph.

use std::fmt;
use std::sync::Arc;

use super::{StopId, TimeOfDay, elapsed_seconds};

/// Dense index of a line inside a timetable graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u32);

impl LineId {
    /// Returns the id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a trip inside a timetable graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(pub u32);

impl TripId {
    /// Returns the id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trip#{}", self.0)
    }
}

/// One scheduled departure between two stops.
///
/// # Invariants
///
/// - `duration` is `arrival − departure`, wrapped past midnight
/// - Never mutated after the graph is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    source_id: u64,
    operator: Arc<str>,
    line: LineId,
    origin: StopId,
    destination: StopId,
    departure: TimeOfDay,
    arrival: TimeOfDay,
    duration: u32,
}

impl Trip {
    /// Create a trip, deriving its duration from the two clock times.
    pub fn new(
        source_id: u64,
        operator: Arc<str>,
        line: LineId,
        origin: StopId,
        destination: StopId,
        departure: TimeOfDay,
        arrival: TimeOfDay,
    ) -> Self {
        Self {
            source_id,
            operator,
            line,
            origin,
            destination,
            departure,
            arrival,
            duration: elapsed_seconds(departure, arrival),
        }
    }

    /// The trip id as given by the timetable source.
    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    /// The operating company.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The line this trip runs on.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// The boarding stop.
    pub fn origin(&self) -> StopId {
        self.origin
    }

    /// The alighting stop.
    pub fn destination(&self) -> StopId {
        self.destination
    }

    /// Scheduled departure time.
    pub fn departure(&self) -> TimeOfDay {
        self.departure
    }

    /// Scheduled arrival time.
    pub fn arrival(&self) -> TimeOfDay {
        self.arrival
    }

    /// Ride time in seconds.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Seconds from `reference` until this trip departs, wrapped at 24 hours.
    ///
    /// Only meaningful for the search that supplied `reference`.
    pub fn offset_from(&self, reference: TimeOfDay) -> u32 {
        elapsed_seconds(reference, self.departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn trip(dep: &str, arr: &str) -> Trip {
        Trip::new(
            1,
            Arc::from("MPK"),
            LineId(0),
            StopId(0),
            StopId(1),
            t(dep),
            t(arr),
        )
    }

    #[test]
    fn duration_is_derived() {
        assert_eq!(trip("08:00:00", "08:10:00").duration(), 600);
    }

    #[test]
    fn duration_wraps_midnight() {
        assert_eq!(trip("23:55:00", "00:05:00").duration(), 600);
    }

    #[test]
    fn offset_depends_on_reference() {
        let trip = trip("08:15:00", "08:25:00");
        assert_eq!(trip.offset_from(t("08:00:00")), 900);
        assert_eq!(trip.offset_from(t("08:15:00")), 0);
        // Already departed today: next usable is tomorrow
        assert_eq!(trip.offset_from(t("08:16:00")), 86_400 - 60);
    }

    #[test]
    fn accessors() {
        let trip = trip("08:00:00", "08:10:00");
        assert_eq!(trip.source_id(), 1);
        assert_eq!(trip.operator(), "MPK");
        assert_eq!(trip.line(), LineId(0));
        assert_eq!(trip.origin(), StopId(0));
        assert_eq!(trip.destination(), StopId(1));
        assert_eq!(trip.departure(), t("08:00:00"));
        assert_eq!(trip.arrival(), t("08:10:00"));
    }
}
