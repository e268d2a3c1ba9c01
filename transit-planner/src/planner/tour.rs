//! Round trips through several stops.
//!
//! Given a start stop and a set of stops to visit, find the visiting order
//! whose closed tour (start, visits..., start) is cheapest under a
//! criterion. Each hop is an ordinary search starting when the previous hop
//! arrives, so the cost of an order depends on the timetable and not just
//! on distances. Orders are explored by tabu search over pairwise swaps.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::domain::{Criterion, Itinerary, TimeOfDay};

use super::config::TourConfig;
use super::search::{Planner, SearchError, SearchRequest};

/// Request for tour planning.
#[derive(Debug, Clone)]
pub struct TourRequest {
    /// Stop the tour starts and ends at.
    pub start: String,

    /// Stops to visit, each exactly once, in any order.
    pub visits: Vec<String>,

    /// Time of day the traveller is ready at the start.
    pub reference: TimeOfDay,

    /// What each hop minimizes.
    pub criterion: Criterion,
}

impl TourRequest {
    /// Create a new time-criterion request.
    pub fn new(start: impl Into<String>, visits: Vec<String>, reference: TimeOfDay) -> Self {
        Self {
            start: start.into(),
            visits,
            reference,
            criterion: Criterion::Time,
        }
    }

    /// Set the criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Validate the tour request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.visits.is_empty() {
            return Err(SearchError::InvalidRequest("no stops to visit".to_string()));
        }

        for (i, stop) in self.visits.iter().enumerate() {
            if *stop == self.start {
                return Err(SearchError::InvalidRequest(format!(
                    "start stop {stop} is also listed as a visit"
                )));
            }
            if self.visits[..i].contains(stop) {
                return Err(SearchError::InvalidRequest(format!("stop {stop} is listed twice")));
            }
        }

        Ok(())
    }
}

/// The cheapest closed tour found.
#[derive(Debug, Clone)]
pub struct Tour {
    criterion: Criterion,
    reference: TimeOfDay,
    order: Vec<String>,
    hops: Vec<Itinerary>,
}

impl Tour {
    /// The criterion each hop minimized.
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// When the tour starts.
    pub fn reference(&self) -> TimeOfDay {
        self.reference
    }

    /// Visited stops in tour order, without the start.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// One itinerary per hop, the last one returning to the start.
    pub fn hops(&self) -> &[Itinerary] {
        &self.hops
    }

    /// Sum of the hop costs.
    pub fn cost(&self) -> u64 {
        self.hops.iter().map(Itinerary::cost).sum()
    }

    /// Seconds from the reference until back at the start.
    pub fn total_duration_secs(&self) -> u64 {
        self.hops
            .iter()
            .map(|hop| u64::from(hop.total_duration_secs()))
            .sum()
    }

    /// Clock time of the return to the start.
    pub fn arrival_time(&self) -> TimeOfDay {
        self.reference.add_seconds(self.total_duration_secs())
    }
}

/// Cost of a visiting order: the criterion's sum, then total time.
type TourCost = (u64, u64);

/// Hop results keyed by (from, to, departure) where index 0 is the start
/// and `i + 1` is `visits[i]`.
type Memo = HashMap<(usize, usize, TimeOfDay), Result<Itinerary, SearchError>>;

/// Tabu search over visiting orders.
pub struct TourPlanner<'p> {
    planner: &'p Planner,
    config: TourConfig,
}

impl<'p> TourPlanner<'p> {
    /// Create a new tour planner.
    pub fn new(planner: &'p Planner, config: TourConfig) -> Self {
        Self { planner, config }
    }

    /// Find the cheapest visiting order for `request`.
    ///
    /// Orders with an unreachable hop are skipped. If no order explored is
    /// feasible, the error of the initial order is returned.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] for empty or repeated visits
    /// - [`SearchError::UnknownStop`] if any name is not in the timetable
    pub fn plan(&self, request: &TourRequest) -> Result<Tour, SearchError> {
        request.validate()?;
        for name in std::iter::once(&request.start).chain(&request.visits) {
            if self.planner.graph().stop_id(name).is_none() {
                return Err(SearchError::UnknownStop(name.clone()));
            }
        }

        let n = request.visits.len();
        let max_iterations = self.config.iterations_for(n);
        let stall_limit = self.config.no_improvement_for(n);
        let tenure = self.config.tenure_for(n);

        let mut memo = Memo::new();
        let mut current: Vec<usize> = (0..n).collect();
        let mut best: Option<(TourCost, Vec<usize>)> = None;
        let initial_error = match self.evaluate(request, &current, &mut memo) {
            Ok((cost, _)) => {
                best = Some((cost, current.clone()));
                None
            }
            Err(err) => Some(err),
        };

        let mut tabu: VecDeque<(usize, usize)> = VecDeque::with_capacity(tenure + 1);
        let mut stall = 0;

        for iteration in 0..max_iterations {
            if stall >= stall_limit {
                break;
            }

            let mut chosen: Option<((usize, usize), TourCost, Vec<usize>)> = None;
            for i in 0..n {
                for j in (i + 1)..n {
                    let mut neighbour = current.clone();
                    neighbour.swap(i, j);
                    let Ok((cost, _)) = self.evaluate(request, &neighbour, &mut memo) else {
                        continue;
                    };

                    // Aspiration: a tabu swap is fine if it beats everything so far
                    let beats_best = best.as_ref().is_none_or(|(b, _)| cost < *b);
                    if tabu.contains(&(i, j)) && !beats_best {
                        continue;
                    }
                    if chosen.as_ref().is_none_or(|(_, c, _)| cost < *c) {
                        chosen = Some(((i, j), cost, neighbour));
                    }
                }
            }

            let Some((swap, cost, order)) = chosen else {
                break;
            };

            current = order;
            tabu.push_back(swap);
            if tabu.len() > tenure {
                tabu.pop_front();
            }

            if best.as_ref().is_none_or(|(b, _)| cost < *b) {
                best = Some((cost, current.clone()));
                stall = 0;
            } else {
                stall += 1;
            }
            trace!(iteration, ?cost, ?swap, stall, "Tabu step");
        }

        let Some((_, order)) = best else {
            // Only reachable when the initial order failed
            return Err(initial_error.unwrap_or_else(|| {
                SearchError::InvalidRequest("no feasible visiting order".to_string())
            }));
        };

        let (cost, hops) = self.evaluate(request, &order, &mut memo)?;
        debug!(?cost, hops = hops.len(), searches = memo.len(), "Tour planned");

        Ok(Tour {
            criterion: request.criterion,
            reference: request.reference,
            order: order.iter().map(|&i| request.visits[i].clone()).collect(),
            hops,
        })
    }

    /// Chain searches along `order`, each starting at the previous arrival.
    fn evaluate(
        &self,
        request: &TourRequest,
        order: &[usize],
        memo: &mut Memo,
    ) -> Result<(TourCost, Vec<Itinerary>), SearchError> {
        let name = |stop: usize| match stop {
            0 => &request.start,
            i => &request.visits[i - 1],
        };

        let stops: Vec<usize> = std::iter::once(0)
            .chain(order.iter().map(|&i| i + 1))
            .chain(std::iter::once(0))
            .collect();

        let mut reference = request.reference;
        let mut hops = Vec::with_capacity(stops.len() - 1);
        let mut cost = 0;
        let mut secs = 0;

        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let hop = memo
                .entry((from, to, reference))
                .or_insert_with(|| {
                    let search =
                        SearchRequest::new(name(from).as_str(), name(to).as_str(), reference)
                            .with_criterion(request.criterion);
                    self.planner.search(&search)
                })
                .clone()?;

            cost += hop.cost();
            secs += u64::from(hop.total_duration_secs());
            reference = hop.arrival_time();
            hops.push(hop);
        }

        let total = match request.criterion {
            Criterion::Time => (secs, secs),
            Criterion::Changes => (cost, secs),
        };
        Ok((total, hops))
    }
}
