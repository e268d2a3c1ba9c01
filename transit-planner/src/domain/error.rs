//! Domain error types.
//!
//! These errors represent itineraries that violate their own invariants.
//! A correct search never produces one; they are distinct from query
//! failures such as an unknown stop.

use super::TripId;

/// Domain-level errors for itinerary consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A leg departs before the traveller reaches its boarding stop
    #[error("{trip} departs {departs}s after reference but traveller is only ready at {ready}s")]
    DepartsBeforeReady { trip: TripId, departs: u32, ready: u32 },

    /// Consecutive legs don't share a stop
    #[error("stops {0} and {1} are not connected")]
    StopsNotConnected(String, String),

    /// Itinerary has no legs but starts and ends at different stops
    #[error("empty itinerary cannot lead from {0} to {1}")]
    EmptyItinerary(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::DepartsBeforeReady {
            trip: TripId(4),
            departs: 100,
            ready: 200,
        };
        assert_eq!(
            err.to_string(),
            "trip#4 departs 100s after reference but traveller is only ready at 200s"
        );

        let err = DomainError::StopsNotConnected("Rynek".into(), "Dworzec".into());
        assert_eq!(err.to_string(), "stops Rynek and Dworzec are not connected");

        let err = DomainError::EmptyItinerary("Rynek".into(), "Dworzec".into());
        assert_eq!(
            err.to_string(),
            "empty itinerary cannot lead from Rynek to Dworzec"
        );
    }
}
