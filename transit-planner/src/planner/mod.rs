//! Route planner over a timetable graph.
//!
//! This module answers "how do I get from stop A to stop B, leaving at this
//! time?" under one of two criteria: earliest arrival, or fewest changes of
//! line. Both searches run on a priority frontier over the immutable graph;
//! a search only ever boards trips that depart after the traveller reaches
//! the stop, so every result respects the timetable.
//!
//! On top of single searches, [`TourPlanner`] orders a round trip through
//! several stops.

mod config;
mod frontier;
mod heuristic;
mod offsets;
mod path;
mod search;
mod time_search;
mod tour;
mod transfer_search;


pub use config::{SearchConfig, TourConfig};
pub use heuristic::{DistanceHeuristic, Heuristic, InvalidMetric, Metric, ZeroHeuristic};
pub use search::{Planner, SearchError, SearchRequest};
pub use tour::{Tour, TourPlanner, TourRequest};
