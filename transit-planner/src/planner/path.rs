//! Itinerary reconstruction from a search's predecessor map.

use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::{Criterion, Itinerary, Leg, StopId, TimeOfDay, TripId};
use crate::timetable::TimetableGraph;

use super::search::SearchError;
use super::transfer_search::LabelId;

/// How a search state was last improved: by riding `trip` from `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step<K> {
    pub(crate) trip: TripId,
    pub(crate) from: K,
}

/// Final label and predecessors of a search that reached its goal.
#[derive(Debug)]
pub(crate) struct Outcome<K> {
    /// Minimized objective at the goal.
    pub(crate) cost: u64,
    /// The state the goal was reached in.
    pub(crate) goal: K,
    pub(crate) preds: HashMap<K, Step<K>>,
}

/// A search state that sits at one stop.
pub(crate) trait AtStop: Copy + Eq + Hash {
    fn stop(&self) -> StopId;
}

impl AtStop for StopId {
    fn stop(&self) -> StopId {
        *self
    }
}

impl AtStop for LabelId {
    fn stop(&self) -> StopId {
        self.stop
    }
}

/// Trips from `start` to `goal` in riding order.
///
/// Fails rather than looping when the map does not lead back to `start`:
/// a missing entry or a chain longer than the map itself means the map is
/// corrupt.
pub(crate) fn trip_sequence<K: AtStop>(
    graph: &TimetableGraph,
    preds: &HashMap<K, Step<K>>,
    start: K,
    goal: K,
) -> Result<Vec<TripId>, SearchError> {
    let mut trips = Vec::new();
    let mut current = goal;

    while current != start {
        let broken =
            || SearchError::BrokenPredecessorChain(graph.stop(current.stop()).name().into());

        if trips.len() >= preds.len() {
            return Err(broken());
        }
        let step = preds.get(&current).ok_or_else(broken)?;
        trips.push(step.trip);
        current = step.from;
    }

    trips.reverse();
    Ok(trips)
}

/// Place `trips` on the timeline of `reference` and wrap them up.
pub(crate) fn build_itinerary(
    graph: &TimetableGraph,
    criterion: Criterion,
    reference: TimeOfDay,
    cost: u64,
    start: StopId,
    goal: StopId,
    trips: &[TripId],
) -> Result<Itinerary, SearchError> {
    let mut legs = Vec::with_capacity(trips.len());
    let mut ready_at = 0;

    for &id in trips {
        let leg = Leg::new(id, graph.trip(id), graph.leg_names(id), reference, ready_at)?;
        ready_at = leg.arrival_offset();
        legs.push(leg);
    }

    let itinerary = Itinerary::new(
        criterion,
        reference,
        cost,
        graph.stop(start).shared_name(),
        graph.stop(goal).shared_name(),
        legs,
    )?;
    Ok(itinerary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{GraphConfig, TimetableRow};

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn chain_graph() -> TimetableGraph {
        let rows = vec![
            TimetableRow::new(1, "1", "A", "B", t("08:00:00"), t("08:10:00")),
            TimetableRow::new(2, "1", "B", "C", t("08:15:00"), t("08:25:00")),
        ];
        TimetableGraph::build(&rows, &GraphConfig::default()).unwrap()
    }

    fn id(graph: &TimetableGraph, name: &str) -> StopId {
        graph.stop_id(name).unwrap()
    }

    #[test]
    fn walks_back_to_start() {
        let graph = chain_graph();
        let (a, b, c) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "C"));
        let preds = HashMap::from([
            (b, Step { trip: TripId(0), from: a }),
            (c, Step { trip: TripId(1), from: b }),
        ]);

        let trips = trip_sequence(&graph, &preds, a, c).unwrap();
        assert_eq!(trips, [TripId(0), TripId(1)]);
    }

    #[test]
    fn start_equals_goal_is_empty() {
        let graph = chain_graph();
        let a = id(&graph, "A");
        let preds: HashMap<StopId, Step<StopId>> = HashMap::new();

        assert!(trip_sequence(&graph, &preds, a, a).unwrap().is_empty());
    }

    #[test]
    fn missing_entry_is_broken_chain() {
        let graph = chain_graph();
        let (a, b, c) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "C"));
        let preds = HashMap::from([(c, Step { trip: TripId(1), from: b })]);

        let err = trip_sequence(&graph, &preds, a, c).unwrap_err();
        assert!(matches!(err, SearchError::BrokenPredecessorChain(ref stop) if stop == "B"));
    }

    #[test]
    fn cycle_is_broken_chain() {
        let graph = chain_graph();
        let (a, b, c) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "C"));
        let preds = HashMap::from([
            (b, Step { trip: TripId(0), from: c }),
            (c, Step { trip: TripId(1), from: b }),
        ]);

        let err = trip_sequence(&graph, &preds, a, c).unwrap_err();
        assert!(matches!(err, SearchError::BrokenPredecessorChain(_)));
    }

    #[test]
    fn labels_reconstruct() {
        let graph = chain_graph();
        let (a, b, c) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "C"));
        let at_b = LabelId { index: 3, stop: b };
        let at_c = LabelId { index: 5, stop: c };
        // A dead end at B that must not be followed
        let other_b = LabelId { index: 4, stop: b };
        let preds = HashMap::from([
            (at_b, Step { trip: TripId(0), from: LabelId::origin(a) }),
            (other_b, Step { trip: TripId(1), from: at_c }),
            (at_c, Step { trip: TripId(1), from: at_b }),
        ]);

        let trips = trip_sequence(&graph, &preds, LabelId::origin(a), at_c).unwrap();
        assert_eq!(trips, [TripId(0), TripId(1)]);
    }

    #[test]
    fn itinerary_carries_waits() {
        let graph = chain_graph();
        let (a, c) = (id(&graph, "A"), id(&graph, "C"));

        let itinerary = build_itinerary(
            &graph,
            Criterion::Time,
            t("07:55:00"),
            1800,
            a,
            c,
            &[TripId(0), TripId(1)],
        )
        .unwrap();

        let waits: Vec<u32> = itinerary.legs().iter().map(Leg::wait_secs).collect();
        assert_eq!(waits, [300, 300]);
        assert_eq!(itinerary.total_duration_secs(), 1800);
    }

    #[test]
    fn infeasible_sequence_is_rejected() {
        let graph = chain_graph();
        let (a, c) = (id(&graph, "A"), id(&graph, "C"));

        // Second trip before the first
        let err = build_itinerary(
            &graph,
            Criterion::Time,
            t("08:00:00"),
            0,
            a,
            c,
            &[TripId(1), TripId(0)],
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidItinerary(_)));
    }
}
