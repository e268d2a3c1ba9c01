//! Fewest-changes search.
//!
//! The state is a stop together with the line the traveller arrived on, as
//! the price of the next ride depends on it: staying on the same line is
//! free, switching costs the configured transfer penalty. The first boarding
//! is free. Labels are `(transfer units, arrival seconds)` compared
//! lexicographically, so among equally good routes the earliest arrival
//! wins. Departure times still filter which trips can be boarded.
//!
//! A state keeps every label no other label on it beats in both units and
//! arrival. A cheap but late label must not hide an expensive early one:
//! only the early one may still catch the next connection.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::domain::{LineId, StopId};
use crate::timetable::TimetableGraph;

use super::frontier::Frontier;
use super::heuristic::{Heuristic, whole_seconds};
use super::offsets::OffsetIndex;
use super::path::{Outcome, Step};

/// A stop and the line used to reach it (`None` at the start).
type LineState = (StopId, Option<LineId>);

/// One label of the search, by its position in the label arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LabelId {
    pub(crate) index: usize,
    pub(crate) stop: StopId,
}

impl LabelId {
    /// The label every search starts from.
    pub(crate) fn origin(start: StopId) -> Self {
        Self {
            index: 0,
            stop: start,
        }
    }
}

#[derive(Debug)]
struct Label {
    state: LineState,
    packed: u64,
    alive: bool,
}

/// Pack a label so integer order is lexicographic order.
fn pack(units: u32, secs: u32) -> u64 {
    (u64::from(units) << 32) | u64::from(secs)
}

fn units_of(label: u64) -> u32 {
    (label >> 32) as u32
}

fn secs_of(label: u64) -> u32 {
    label as u32
}

/// Whether `a` is no worse than `b` in both units and arrival.
fn dominates(a: u64, b: u64) -> bool {
    units_of(a) <= units_of(b) && secs_of(a) <= secs_of(b)
}

/// Non-dominated labels per state.
#[derive(Debug, Default)]
struct Bags {
    labels: Vec<Label>,
    by_state: HashMap<LineState, Vec<usize>>,
}

impl Bags {
    /// Add `packed` to the bag of `state` unless a label there dominates
    /// it. Labels the new one dominates are retired.
    fn insert(&mut self, state: LineState, packed: u64) -> Option<usize> {
        let bag = self.by_state.entry(state).or_default();
        let labels = &mut self.labels;

        if bag.iter().any(|&i| dominates(labels[i].packed, packed)) {
            return None;
        }
        bag.retain(|&i| {
            let keep = !dominates(packed, labels[i].packed);
            labels[i].alive &= keep;
            keep
        });

        let index = labels.len();
        labels.push(Label {
            state,
            packed,
            alive: true,
        });
        bag.push(index);
        Some(index)
    }
}

/// Fewest transfer units to `goal`, or `None` if the frontier runs dry.
///
/// The outcome's cost is the transfer units; the heuristic only reorders
/// states with equal units. Predecessors are keyed by label, starting from
/// [`LabelId::origin`].
pub(crate) fn fewest_changes(
    graph: &TimetableGraph,
    offsets: &OffsetIndex,
    start: StopId,
    goal: StopId,
    transfer_penalty: u32,
    heuristic: Option<&dyn Heuristic>,
) -> Option<Outcome<LabelId>> {
    let goal_stop = graph.stop(goal);
    let priority = |label: u64, stop: StopId| {
        let estimate = heuristic.map_or(0, |h| whole_seconds(h, graph.stop(stop), goal_stop));
        // Never let the estimate carry into the units half
        let secs = u64::from(secs_of(label))
            .saturating_add(estimate)
            .min(u64::from(u32::MAX)) as u32;
        pack(units_of(label), secs)
    };

    let mut bags = Bags::default();
    let mut preds: HashMap<LabelId, Step<LabelId>> = HashMap::new();
    let mut frontier = Frontier::new();
    let mut expanded = 0usize;

    let origin = bags.insert((start, None), 0)?;
    frontier.push(priority(0, start), 0, origin);

    while let Some(entry) = frontier.pop() {
        let index = entry.state;
        let Label {
            state: (stop, line),
            packed,
            alive,
        } = bags.labels[index];

        if !alive {
            continue;
        }
        expanded += 1;

        let (units, arrival) = (units_of(packed), secs_of(packed));
        trace!(stop = %graph.stop(stop), ?line, units, arrival, "Expanding label");
        let here = LabelId { index, stop };

        if stop == goal {
            debug!(
                expanded,
                pushed = frontier.pushed(),
                labels = bags.labels.len(),
                units,
                arrival,
                "Fewest-changes search reached goal"
            );
            return Some(Outcome {
                cost: u64::from(units),
                goal: here,
                preds,
            });
        }

        for &bucket_id in graph.outgoing(stop) {
            let Some(boarding) = offsets.best_boarding(graph, bucket_id, arrival) else {
                continue;
            };
            let bucket = graph.bucket(bucket_id);

            let penalty = match line {
                Some(current) if current != bucket.line() => transfer_penalty,
                _ => 0,
            };
            let next: LineState = (bucket.destination(), Some(bucket.line()));
            let next_label = pack(units.saturating_add(penalty), boarding.arrival_offset);

            let Some(added) = bags.insert(next, next_label) else {
                continue;
            };
            preds.insert(
                LabelId {
                    index: added,
                    stop: next.0,
                },
                Step {
                    trip: boarding.trip,
                    from: here,
                },
            );
            frontier.push(priority(next_label, next.0), next_label, added);
        }
    }

    debug!(
        expanded,
        pushed = frontier.pushed(),
        labels = bags.labels.len(),
        reference = %offsets.reference(),
        "Fewest-changes search exhausted frontier"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_labels_order_lexicographically() {
        assert!(pack(0, u32::MAX) < pack(1, 0));
        assert!(pack(10, 100) < pack(10, 101));
        assert_eq!(units_of(pack(20, 3600)), 20);
        assert_eq!(secs_of(pack(20, 3600)), 3600);
    }

    #[test]
    fn bags_keep_cheap_late_and_dear_early_labels() {
        let state = (StopId(1), Some(LineId(0)));
        let mut bags = Bags::default();

        let late = bags.insert(state, pack(0, 5400)).unwrap();
        let early = bags.insert(state, pack(10, 1200)).unwrap();
        assert_eq!(bags.by_state[&state], [late, early]);

        // No better in either component
        assert!(bags.insert(state, pack(10, 1300)).is_none());
        assert!(bags.insert(state, pack(0, 5400)).is_none());
    }

    #[test]
    fn dominating_label_retires_the_others() {
        let state = (StopId(1), None);
        let mut bags = Bags::default();

        let first = bags.insert(state, pack(10, 1200)).unwrap();
        let second = bags.insert(state, pack(20, 600)).unwrap();
        let best = bags.insert(state, pack(0, 600)).unwrap();

        assert_eq!(bags.by_state[&state], [best]);
        assert!(!bags.labels[first].alive);
        assert!(!bags.labels[second].alive);
        assert!(bags.labels[best].alive);
    }
}
