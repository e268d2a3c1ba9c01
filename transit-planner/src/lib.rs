//! Transit route planner.
//!
//! Loads a timetable of direct trips between stops and answers: "leaving
//! this stop at this time, how do I get there soonest, or with the fewest
//! changes of line?" Also plans round trips through several stops.

pub mod domain;
pub mod planner;
pub mod report;
pub mod timetable;
