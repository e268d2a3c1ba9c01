//! Route search entry point.
//!
//! The [`Planner`] owns a shared timetable graph and answers single
//! queries: resolve stop names, pick the engine for the criterion, run it on
//! the offset view of the query's reference time and rebuild the itinerary.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Criterion, DomainError, Itinerary, StopId, TimeOfDay};
use crate::timetable::TimetableGraph;

use super::config::SearchConfig;
use super::heuristic::Heuristic;
use super::offsets::OffsetCache;
use super::path::{build_itinerary, trip_sequence};
use super::time_search::earliest_arrival;
use super::transfer_search::{LabelId, fewest_changes};

/// Error from route search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// A stop name is not in the timetable
    #[error("unknown stop: {0}")]
    UnknownStop(String),

    /// No sequence of trips leads to the goal
    #[error("no route from {from} to {to} after {reference}")]
    Unreachable {
        from: String,
        to: String,
        reference: TimeOfDay,
    },

    /// The predecessor map does not lead back to the start
    #[error("predecessor chain broken at {0}")]
    BrokenPredecessorChain(String),

    /// Reconstructed legs do not form a valid itinerary
    #[error("invalid itinerary: {0}")]
    InvalidItinerary(#[from] DomainError),

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Request for route search.
#[derive(Clone)]
pub struct SearchRequest {
    /// Name of the stop to start from.
    pub start: String,

    /// Name of the stop to reach.
    pub goal: String,

    /// Time of day the traveller is ready at the start.
    pub reference: TimeOfDay,

    /// What to minimize.
    pub criterion: Criterion,

    /// Remaining-time estimate turning the search into A*.
    pub heuristic: Option<Arc<dyn Heuristic>>,
}

impl SearchRequest {
    /// Create a new time-criterion request without a heuristic.
    pub fn new(start: impl Into<String>, goal: impl Into<String>, reference: TimeOfDay) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            reference,
            criterion: Criterion::Time,
            heuristic: None,
        }
    }

    /// Set the criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the heuristic.
    pub fn with_heuristic(mut self, heuristic: impl Heuristic + 'static) -> Self {
        self.heuristic = Some(Arc::new(heuristic));
        self
    }
}

impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("start", &self.start)
            .field("goal", &self.goal)
            .field("reference", &self.reference)
            .field("criterion", &self.criterion)
            .field("heuristic", &self.heuristic.is_some())
            .finish()
    }
}

/// Route planner over one timetable.
///
/// Cheap to share: wrap it in an `Arc` and run searches from as many
/// threads as needed.
pub struct Planner {
    graph: Arc<TimetableGraph>,
    config: SearchConfig,
    offsets: OffsetCache,
}

impl Planner {
    /// Create a new planner.
    pub fn new(graph: Arc<TimetableGraph>, config: SearchConfig) -> Self {
        let offsets = OffsetCache::new(config.offset_cache_capacity);
        Self {
            graph,
            config,
            offsets,
        }
    }

    /// The timetable this planner searches.
    pub fn graph(&self) -> &TimetableGraph {
        &self.graph
    }

    /// The configuration searches run with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the best itinerary for `request`.
    ///
    /// The itinerary's cost is seconds since the reference time for
    /// [`Criterion::Time`] and transfer units for [`Criterion::Changes`].
    /// A request whose start and goal coincide yields an empty itinerary
    /// with cost 0.
    ///
    /// # Errors
    ///
    /// - [`SearchError::UnknownStop`] if either name is not in the timetable
    /// - [`SearchError::Unreachable`] if no trips lead to the goal
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transit_planner::domain::TimeOfDay;
    /// use transit_planner::planner::{Planner, SearchConfig, SearchRequest};
    /// use transit_planner::timetable::{GraphConfig, TimetableGraph, TimetableRow};
    ///
    /// let t = |s| TimeOfDay::parse(s).unwrap();
    /// let rows = vec![
    ///     TimetableRow::new(1, "A", "Rynek", "Dworzec", t("08:00:00"), t("08:10:00")),
    ///     TimetableRow::new(2, "A", "Dworzec", "Biskupin", t("08:15:00"), t("08:25:00")),
    /// ];
    /// let graph = TimetableGraph::build(&rows, &GraphConfig::default()).unwrap();
    /// let planner = Planner::new(Arc::new(graph), SearchConfig::default());
    ///
    /// let request = SearchRequest::new("Rynek", "Biskupin", t("08:00:00"));
    /// let itinerary = planner.search(&request).unwrap();
    /// assert_eq!(itinerary.cost(), 1500);
    /// assert_eq!(itinerary.legs().len(), 2);
    /// ```
    pub fn search(&self, request: &SearchRequest) -> Result<Itinerary, SearchError> {
        let graph = &*self.graph;
        let start = self.resolve(&request.start)?;
        let goal = self.resolve(&request.goal)?;

        debug!(
            start = %request.start,
            goal = %request.goal,
            reference = %request.reference,
            criterion = %request.criterion,
            heuristic = request.heuristic.is_some(),
            "Searching"
        );

        let offsets = self.offsets.get(graph, request.reference);
        let heuristic = request.heuristic.as_deref();

        let (cost, trips) = match request.criterion {
            Criterion::Time => {
                let outcome = earliest_arrival(graph, &offsets, start, goal, heuristic)
                    .ok_or_else(|| unreachable_error(request))?;
                let trips = trip_sequence(graph, &outcome.preds, start, outcome.goal)?;
                (outcome.cost, trips)
            }
            Criterion::Changes => {
                let outcome = fewest_changes(
                    graph,
                    &offsets,
                    start,
                    goal,
                    self.config.transfer_penalty,
                    heuristic,
                )
                .ok_or_else(|| unreachable_error(request))?;
                let trips =
                    trip_sequence(graph, &outcome.preds, LabelId::origin(start), outcome.goal)?;
                (outcome.cost, trips)
            }
        };

        build_itinerary(
            graph,
            request.criterion,
            request.reference,
            cost,
            start,
            goal,
            &trips,
        )
    }

    fn resolve(&self, name: &str) -> Result<StopId, SearchError> {
        self.graph
            .stop_id(name)
            .ok_or_else(|| SearchError::UnknownStop(name.to_string()))
    }
}

fn unreachable_error(request: &SearchRequest) -> SearchError {
    SearchError::Unreachable {
        from: request.start.clone(),
        to: request.goal.clone(),
        reference: request.reference,
    }
}
