//! Domain types for the transit planner.
//!
//! This module contains the core domain model types: clock times, stops,
//! scheduled trips and the itineraries built from them. Types enforce
//! their invariants at construction time, so code that receives them can
//! trust their validity.

mod criterion;
mod error;
mod itinerary;
mod leg;
mod stop;
mod time;
mod trip;

pub use criterion::{Criterion, InvalidCriterion};
pub use error::DomainError;
pub use itinerary::Itinerary;
pub use leg::{Leg, LegNames};
pub use stop::{Stop, StopId};
pub use time::{SECONDS_PER_DAY, TimeError, TimeOfDay, elapsed_seconds};
pub use trip::{LineId, Trip, TripId};
