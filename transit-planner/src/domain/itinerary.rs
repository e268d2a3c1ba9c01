//! Itinerary types.
//!
//! An `Itinerary` is the answer to one query: the ordered legs from the
//! start stop to the goal stop, placed on the timeline of the query's
//! reference time, together with the cost the search minimized.

use std::sync::Arc;

use super::{Criterion, DomainError, Leg, TimeOfDay};

/// A complete route from origin to destination.
///
/// # Invariants
///
/// - The first leg boards at `origin`, the last alights at `destination`
/// - Consecutive legs connect (alighting stop = next boarding stop)
/// - Each leg departs no earlier than the previous one arrives
/// - An empty itinerary has `origin == destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    criterion: Criterion,
    reference: TimeOfDay,
    cost: u64,
    origin: Arc<str>,
    destination: Arc<str>,
    legs: Vec<Leg>,
}

impl Itinerary {
    /// Constructs an itinerary, validating that legs chain together.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - Legs don't connect, or don't start/end at `origin`/`destination`
    /// - A leg departs before the previous leg arrives
    /// - There are no legs but `origin != destination`
    pub fn new(
        criterion: Criterion,
        reference: TimeOfDay,
        cost: u64,
        origin: Arc<str>,
        destination: Arc<str>,
        legs: Vec<Leg>,
    ) -> Result<Self, DomainError> {
        match (legs.first(), legs.last()) {
            (None, _) | (_, None) => {
                if origin != destination {
                    return Err(DomainError::EmptyItinerary(
                        origin.to_string(),
                        destination.to_string(),
                    ));
                }
            }
            (Some(first), Some(last)) => {
                if first.origin() != &*origin {
                    return Err(DomainError::StopsNotConnected(
                        origin.to_string(),
                        first.origin().to_string(),
                    ));
                }
                if last.destination() != &*destination {
                    return Err(DomainError::StopsNotConnected(
                        last.destination().to_string(),
                        destination.to_string(),
                    ));
                }
            }
        }

        for window in legs.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            if prev.destination() != next.origin() {
                return Err(DomainError::StopsNotConnected(
                    prev.destination().to_string(),
                    next.origin().to_string(),
                ));
            }
            if next.departure_offset() < prev.arrival_offset() {
                return Err(DomainError::DepartsBeforeReady {
                    trip: next.trip(),
                    departs: next.departure_offset(),
                    ready: prev.arrival_offset(),
                });
            }
        }

        Ok(Itinerary {
            criterion,
            reference,
            cost,
            origin,
            destination,
            legs,
        })
    }

    /// The criterion the search minimized.
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// The traveller's starting time.
    pub fn reference(&self) -> TimeOfDay {
        self.reference
    }

    /// The minimized objective: seconds for [`Criterion::Time`], weighted
    /// transfer units for [`Criterion::Changes`].
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// The start stop name.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The goal stop name.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// All legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns true if start and goal coincide and no ride is needed.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Seconds from the reference time until arrival at the goal,
    /// including the initial wait.
    pub fn total_duration_secs(&self) -> u32 {
        self.legs.last().map_or(0, Leg::arrival_offset)
    }

    /// Seconds from boarding the first leg until alighting from the last.
    pub fn travel_secs(&self) -> u32 {
        match (self.legs.first(), self.legs.last()) {
            (Some(first), Some(last)) => last.arrival_offset() - first.departure_offset(),
            _ => 0,
        }
    }

    /// Total seconds spent waiting at stops, including before the first leg.
    pub fn total_wait_secs(&self) -> u32 {
        self.legs.iter().map(Leg::wait_secs).sum()
    }

    /// Number of times the traveller switches to a different line.
    pub fn change_count(&self) -> usize {
        self.legs
            .windows(2)
            .filter(|w| w[0].line() != w[1].line())
            .count()
    }

    /// Distinct lines in riding order, consecutive repeats collapsed.
    pub fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = self.legs.iter().map(Leg::line).collect();
        lines.dedup();
        lines
    }

    /// Clock time of the first departure, or the reference if empty.
    pub fn departure_time(&self) -> TimeOfDay {
        self.legs
            .first()
            .map_or(self.reference, Leg::departure_time)
    }

    /// Clock time of arrival at the goal, or the reference if empty.
    pub fn arrival_time(&self) -> TimeOfDay {
        self.reference
            .add_seconds(u64::from(self.total_duration_secs()))
    }
}
