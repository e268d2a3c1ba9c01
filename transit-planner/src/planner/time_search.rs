//! Earliest-arrival search.
//!
//! Dijkstra over stops where an edge is only usable from its scheduled
//! departure on. The label of a stop is the number of seconds from the
//! reference time until the traveller can be there; riding a trip costs the
//! wait for it plus its duration. With a heuristic the frontier is ordered
//! by label plus estimate, which is A*.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::domain::StopId;
use crate::timetable::TimetableGraph;

use super::frontier::Frontier;
use super::heuristic::{Heuristic, whole_seconds};
use super::offsets::OffsetIndex;
use super::path::{Outcome, Step};

/// Earliest arrival at `goal`, or `None` if the frontier runs dry first.
pub(crate) fn earliest_arrival(
    graph: &TimetableGraph,
    offsets: &OffsetIndex,
    start: StopId,
    goal: StopId,
    heuristic: Option<&dyn Heuristic>,
) -> Option<Outcome<StopId>> {
    let goal_stop = graph.stop(goal);
    let estimate =
        |stop: StopId| heuristic.map_or(0, |h| whole_seconds(h, graph.stop(stop), goal_stop));

    let mut best = vec![u32::MAX; graph.stop_count()];
    let mut preds: HashMap<StopId, Step<StopId>> = HashMap::new();
    let mut frontier = Frontier::new();
    let mut expanded = 0;

    best[start.index()] = 0;
    frontier.push(estimate(start), 0, start);

    while let Some(entry) = frontier.pop() {
        let current = entry.state;
        // Snapshot; `best` is only written for other stops below
        let cost = entry.cost as u32;

        if cost > best[current.index()] {
            continue;
        }
        expanded += 1;
        trace!(stop = %graph.stop(current), cost, "Expanding stop");

        if current == goal {
            debug!(
                expanded,
                pushed = frontier.pushed(),
                cost,
                "Earliest-arrival search reached goal"
            );
            return Some(Outcome {
                cost: u64::from(cost),
                goal,
                preds,
            });
        }

        for &bucket in graph.outgoing(current) {
            let Some(boarding) = offsets.best_boarding(graph, bucket, cost) else {
                continue;
            };
            let next = graph.bucket(bucket).destination();

            if boarding.arrival_offset < best[next.index()] {
                best[next.index()] = boarding.arrival_offset;
                preds.insert(
                    next,
                    Step {
                        trip: boarding.trip,
                        from: current,
                    },
                );
                let arrival = u64::from(boarding.arrival_offset);
                frontier.push(arrival.saturating_add(estimate(next)), arrival, next);
            }
        }
    }

    debug!(
        expanded,
        pushed = frontier.pushed(),
        reference = %offsets.reference(),
        "Earliest-arrival search exhausted frontier"
    );
    None
}
