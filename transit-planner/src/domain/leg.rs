//! Itinerary leg type.
//!
//! A `Leg` is one ride on one trip, placed on the timeline of a particular
//! search: it knows how long the traveller waited for it and when it
//! departs and arrives relative to the search's reference time.

use std::sync::Arc;

use super::{DomainError, TimeOfDay, Trip, TripId};

/// Display names for the line and stops a leg runs between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegNames {
    pub line: Arc<str>,
    pub origin: Arc<str>,
    pub destination: Arc<str>,
}

/// A leg of an itinerary (one trip).
///
/// # Invariants
///
/// - `departure_offset >= ready_at`, so `wait_secs` is never negative
/// - `arrival_offset == departure_offset + trip duration`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    trip: TripId,
    source_id: u64,
    operator: Arc<str>,
    names: LegNames,
    departure: TimeOfDay,
    arrival: TimeOfDay,
    departure_offset: u32,
    arrival_offset: u32,
    wait_secs: u32,
}

impl Leg {
    /// Place `trip` on the timeline of a search starting at `reference`,
    /// with the traveller reaching the boarding stop `ready_at` seconds
    /// after the reference.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the trip departs before the traveller is ready.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transit_planner::domain::{Leg, LegNames, LineId, StopId, TimeOfDay, Trip, TripId};
    ///
    /// let t = |s| TimeOfDay::parse(s).unwrap();
    /// let trip = Trip::new(1, Arc::from("MPK"), LineId(0), StopId(1), StopId(2), t("08:15:00"), t("08:25:00"));
    /// let names = LegNames {
    ///     line: Arc::from("A"),
    ///     origin: Arc::from("B"),
    ///     destination: Arc::from("C"),
    /// };
    ///
    /// let leg = Leg::new(TripId(0), &trip, names, t("08:12:00"), 0).unwrap();
    /// assert_eq!(leg.wait_secs(), 180);
    /// assert_eq!(leg.arrival_offset(), 780);
    /// ```
    pub fn new(
        id: TripId,
        trip: &Trip,
        names: LegNames,
        reference: TimeOfDay,
        ready_at: u32,
    ) -> Result<Self, DomainError> {
        let departure_offset = trip.offset_from(reference);
        if departure_offset < ready_at {
            return Err(DomainError::DepartsBeforeReady {
                trip: id,
                departs: departure_offset,
                ready: ready_at,
            });
        }

        Ok(Leg {
            trip: id,
            source_id: trip.source_id(),
            operator: Arc::from(trip.operator()),
            names,
            departure: trip.departure(),
            arrival: trip.arrival(),
            departure_offset,
            arrival_offset: departure_offset + trip.duration(),
            wait_secs: departure_offset - ready_at,
        })
    }

    /// The graph trip this leg rides.
    pub fn trip(&self) -> TripId {
        self.trip
    }

    /// The trip id as given by the timetable source.
    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    /// The operating company.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The line name.
    pub fn line(&self) -> &str {
        &self.names.line
    }

    /// The boarding stop name.
    pub fn origin(&self) -> &str {
        &self.names.origin
    }

    /// The alighting stop name.
    pub fn destination(&self) -> &str {
        &self.names.destination
    }

    /// Scheduled departure time.
    pub fn departure_time(&self) -> TimeOfDay {
        self.departure
    }

    /// Scheduled arrival time.
    pub fn arrival_time(&self) -> TimeOfDay {
        self.arrival
    }

    /// Seconds from the reference time until departure.
    pub fn departure_offset(&self) -> u32 {
        self.departure_offset
    }

    /// Seconds from the reference time until arrival.
    pub fn arrival_offset(&self) -> u32 {
        self.arrival_offset
    }

    /// Seconds spent waiting at the boarding stop.
    pub fn wait_secs(&self) -> u32 {
        self.wait_secs
    }

    /// Ride time in seconds.
    pub fn ride_secs(&self) -> u32 {
        self.arrival_offset - self.departure_offset
    }
}
