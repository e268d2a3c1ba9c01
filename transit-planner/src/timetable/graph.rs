//! The timetable graph.
//!
//! Stops are nodes and scheduled trips are edges. Trips are grouped into
//! buckets keyed by (line, origin, destination); each bucket is sorted by
//! departure so a search can find "the next usable trip" without sorting
//! per query. The graph is immutable once built and can be shared freely
//! between concurrent searches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::domain::{LegNames, LineId, Stop, StopId, Trip, TripId};

use super::error::TimetableError;
use super::row::TimetableRow;

/// Configuration for graph construction.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Largest per-axis difference, in degrees, tolerated between two rows
    /// giving coordinates for the same stop name. The first coordinates
    /// seen are kept.
    pub coordinate_tolerance: f64,
}

impl GraphConfig {
    /// Create a new configuration.
    pub fn new(coordinate_tolerance: f64) -> Self {
        Self {
            coordinate_tolerance,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            // Roughly 1 km; platforms of one stop are a few hundred metres apart
            coordinate_tolerance: 0.01,
        }
    }
}

/// Dense index of a bucket inside a timetable graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketId(pub u32);

impl BucketId {
    /// Returns the id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All trips of one line between one ordered pair of stops.
///
/// # Invariants
///
/// - `trips` is strictly ascending by departure time
#[derive(Debug, Clone)]
pub struct Bucket {
    line: LineId,
    origin: StopId,
    destination: StopId,
    trips: Vec<TripId>,
}

impl Bucket {
    /// The line every trip in the bucket runs on.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// The shared boarding stop.
    pub fn origin(&self) -> StopId {
        self.origin
    }

    /// The shared alighting stop.
    pub fn destination(&self) -> StopId {
        self.destination
    }

    /// Trips ordered by departure.
    pub fn trips(&self) -> &[TripId] {
        &self.trips
    }
}

/// Immutable index of a timetable.
#[derive(Debug)]
pub struct TimetableGraph {
    stops: Vec<Stop>,
    stop_index: HashMap<Arc<str>, StopId>,
    lines: Vec<Arc<str>>,
    line_index: HashMap<Arc<str>, LineId>,
    trips: Vec<Trip>,
    buckets: Vec<Bucket>,
    bucket_index: HashMap<(LineId, StopId, StopId), BucketId>,
    outgoing: Vec<Vec<BucketId>>,
}

impl TimetableGraph {
    /// Build the graph from validated rows.
    ///
    /// Stops are deduplicated by name. Within a bucket, trips sharing a
    /// departure time are collapsed to the one arriving first.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::MalformedTimetable`] if a row has an empty
    /// name or out-of-range coordinates, or if one stop name appears with
    /// coordinates further apart than `config.coordinate_tolerance`.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TimeOfDay;
    /// use transit_planner::timetable::{GraphConfig, TimetableGraph, TimetableRow};
    ///
    /// let t = |s| TimeOfDay::parse(s).unwrap();
    /// let rows = vec![
    ///     TimetableRow::new(1, "A", "Rynek", "Dworzec", t("08:10:00"), t("08:20:00")),
    ///     TimetableRow::new(2, "A", "Rynek", "Dworzec", t("08:00:00"), t("08:10:00")),
    /// ];
    ///
    /// let graph = TimetableGraph::build(&rows, &GraphConfig::default()).unwrap();
    /// assert_eq!(graph.stop_count(), 2);
    ///
    /// let departures: Vec<String> = graph
    ///     .trips_between("A", "Rynek", "Dworzec")
    ///     .unwrap()
    ///     .map(|trip| trip.departure().to_string())
    ///     .collect();
    /// assert_eq!(departures, ["08:00:00", "08:10:00"]);
    /// ```
    pub fn build(rows: &[TimetableRow], config: &GraphConfig) -> Result<Self, TimetableError> {
        let mut builder = GraphBuilder::new(config);
        for row in rows {
            builder.add_row(row)?;
        }
        Ok(builder.finish())
    }

    /// Number of distinct stops.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of trips kept after deduplication.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Number of (line, origin, destination) buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the graph has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Look up a stop id by name.
    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    /// Look up a stop by name.
    pub fn stop_by_name(&self, name: &str) -> Option<&Stop> {
        self.stop_id(name).map(|id| self.stop(id))
    }

    /// Returns the stop with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.index()]
    }

    /// All stops in id order.
    pub fn stops(&self) -> impl Iterator<Item = (StopId, &Stop)> {
        self.stops
            .iter()
            .enumerate()
            .map(|(i, stop)| (StopId(i as u32), stop))
    }

    /// Look up a line id by name.
    pub fn line_id(&self, name: &str) -> Option<LineId> {
        self.line_index.get(name).copied()
    }

    /// Returns the name of a line.
    pub fn line_name(&self, id: LineId) -> &str {
        &self.lines[id.index()]
    }

    /// Returns the trip with the given id.
    pub fn trip(&self, id: TripId) -> &Trip {
        &self.trips[id.index()]
    }

    /// Returns the bucket with the given id.
    pub fn bucket(&self, id: BucketId) -> &Bucket {
        &self.buckets[id.index()]
    }

    /// Buckets whose trips board at `stop`.
    pub fn outgoing(&self, stop: StopId) -> &[BucketId] {
        &self.outgoing[stop.index()]
    }

    /// Lines with at least one trip boarding at `stop`, without repeats.
    pub fn lines_serving(&self, stop: StopId) -> Vec<LineId> {
        let mut seen = HashSet::new();
        self.outgoing(stop)
            .iter()
            .map(|&b| self.bucket(b).line())
            .filter(|line| seen.insert(*line))
            .collect()
    }

    /// Trips of `line` from `origin` to `destination`, ordered by departure.
    ///
    /// Returns `None` if any name is unknown or the line does not run
    /// between the two stops.
    pub fn trips_between(
        &self,
        line: &str,
        origin: &str,
        destination: &str,
    ) -> Option<impl Iterator<Item = &Trip>> {
        let key = (
            self.line_id(line)?,
            self.stop_id(origin)?,
            self.stop_id(destination)?,
        );
        let bucket = self.bucket(*self.bucket_index.get(&key)?);
        Some(bucket.trips().iter().map(|&id| self.trip(id)))
    }

    /// Display names for riding `trip`.
    pub fn leg_names(&self, trip: TripId) -> LegNames {
        let trip = self.trip(trip);
        LegNames {
            line: Arc::clone(&self.lines[trip.line().index()]),
            origin: self.stop(trip.origin()).shared_name(),
            destination: self.stop(trip.destination()).shared_name(),
        }
    }
}

/// Trips collected for one bucket before sorting.
struct PendingBucket {
    line: LineId,
    origin: StopId,
    destination: StopId,
    trips: Vec<Trip>,
}

/// Accumulates rows into interned stops, lines and buckets.
struct GraphBuilder<'c> {
    config: &'c GraphConfig,
    stops: Vec<Stop>,
    stop_index: HashMap<Arc<str>, StopId>,
    lines: Vec<Arc<str>>,
    line_index: HashMap<Arc<str>, LineId>,
    operators: HashSet<Arc<str>>,
    pending: Vec<PendingBucket>,
    pending_index: HashMap<(LineId, StopId, StopId), usize>,
}

impl<'c> GraphBuilder<'c> {
    fn new(config: &'c GraphConfig) -> Self {
        Self {
            config,
            stops: Vec::new(),
            stop_index: HashMap::new(),
            lines: Vec::new(),
            line_index: HashMap::new(),
            operators: HashSet::new(),
            pending: Vec::new(),
            pending_index: HashMap::new(),
        }
    }

    fn add_row(&mut self, row: &TimetableRow) -> Result<(), TimetableError> {
        if row.line.trim().is_empty() {
            return Err(TimetableError::malformed(row.trip_id, "empty line name"));
        }

        let origin = self.intern_stop(row.trip_id, &row.origin, row.origin_lat, row.origin_lon)?;
        let destination = self.intern_stop(
            row.trip_id,
            &row.destination,
            row.destination_lat,
            row.destination_lon,
        )?;
        let line = self.intern_line(&row.line);
        let operator = self.intern_operator(&row.operator);

        let trip = Trip::new(
            row.trip_id,
            operator,
            line,
            origin,
            destination,
            row.departure,
            row.arrival,
        );

        let key = (line, origin, destination);
        let slot = match self.pending_index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.pending.push(PendingBucket {
                    line,
                    origin,
                    destination,
                    trips: Vec::new(),
                });
                self.pending_index.insert(key, self.pending.len() - 1);
                self.pending.len() - 1
            }
        };
        self.pending[slot].trips.push(trip);

        Ok(())
    }

    fn intern_stop(
        &mut self,
        trip_id: u64,
        name: &str,
        lat: f64,
        lon: f64,
    ) -> Result<StopId, TimetableError> {
        if name.trim().is_empty() {
            return Err(TimetableError::malformed(trip_id, "empty stop name"));
        }
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(TimetableError::malformed(
                trip_id,
                format!("stop {name} has invalid coordinates ({lat}, {lon})"),
            ));
        }

        if let Some(&id) = self.stop_index.get(name) {
            let existing = &self.stops[id.index()];
            if !existing.is_near(lat, lon, self.config.coordinate_tolerance) {
                return Err(TimetableError::malformed(
                    trip_id,
                    format!(
                        "stop {name} has inconsistent coordinates ({}, {}) and ({lat}, {lon})",
                        existing.lat(),
                        existing.lon()
                    ),
                ));
            }
            return Ok(id);
        }

        let id = StopId(self.stops.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.stops.push(Stop::new(Arc::clone(&name), lat, lon));
        self.stop_index.insert(name, id);
        Ok(id)
    }

    fn intern_line(&mut self, name: &str) -> LineId {
        if let Some(&id) = self.line_index.get(name) {
            return id;
        }
        let id = LineId(self.lines.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.lines.push(Arc::clone(&name));
        self.line_index.insert(name, id);
        id
    }

    fn intern_operator(&mut self, name: &str) -> Arc<str> {
        if let Some(existing) = self.operators.get(name) {
            return Arc::clone(existing);
        }
        let name: Arc<str> = Arc::from(name);
        self.operators.insert(Arc::clone(&name));
        name
    }

    fn finish(self) -> TimetableGraph {
        let mut trips = Vec::new();
        let mut buckets = Vec::with_capacity(self.pending.len());
        let mut bucket_index = HashMap::with_capacity(self.pending.len());
        let mut outgoing = vec![Vec::new(); self.stops.len()];
        let mut collapsed = 0usize;

        for mut pending in self.pending {
            // Shortest ride first among equal departures, so dedup keeps it
            pending
                .trips
                .sort_by_key(|trip| (trip.departure(), trip.duration()));
            let before = pending.trips.len();
            pending.trips.dedup_by_key(|trip| trip.departure());
            collapsed += before - pending.trips.len();

            let ids = pending
                .trips
                .into_iter()
                .map(|trip| {
                    trips.push(trip);
                    TripId(trips.len() as u32 - 1)
                })
                .collect();

            let id = BucketId(buckets.len() as u32);
            bucket_index.insert((pending.line, pending.origin, pending.destination), id);
            outgoing[pending.origin.index()].push(id);
            buckets.push(Bucket {
                line: pending.line,
                origin: pending.origin,
                destination: pending.destination,
                trips: ids,
            });
        }

        debug!(
            stops = self.stops.len(),
            lines = self.lines.len(),
            trips = trips.len(),
            buckets = buckets.len(),
            collapsed,
            "Timetable graph built"
        );

        TimetableGraph {
            stops: self.stops,
            stop_index: self.stop_index,
            lines: self.lines,
            line_index: self.line_index,
            trips,
            buckets,
            bucket_index,
            outgoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeOfDay;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn row(id: u64, line: &str, from: &str, to: &str, dep: &str, arr: &str) -> TimetableRow {
        TimetableRow::new(id, line, from, to, t(dep), t(arr))
    }

    fn build(rows: &[TimetableRow]) -> TimetableGraph {
        TimetableGraph::build(rows, &GraphConfig::default()).unwrap()
    }

    fn departures(graph: &TimetableGraph, line: &str, from: &str, to: &str) -> Vec<String> {
        graph
            .trips_between(line, from, to)
            .unwrap()
            .map(|trip| trip.departure().to_string())
            .collect()
    }

    #[test]
    fn empty_rows_build_empty_graph() {
        let graph = build(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.trip_count(), 0);
        assert_eq!(graph.bucket_count(), 0);
    }

    #[test]
    fn stops_are_deduplicated_by_name() {
        let graph = build(&[
            row(1, "A", "X", "Y", "08:00:00", "08:05:00"),
            row(2, "B", "Y", "X", "09:00:00", "09:05:00"),
            row(3, "A", "Y", "Z", "08:06:00", "08:10:00"),
        ]);

        assert_eq!(graph.stop_count(), 3);
        assert_eq!(graph.line_count(), 2);
        let y = graph.stop_id("Y").unwrap();
        assert_eq!(graph.stop(y).name(), "Y");
        assert_eq!(graph.trip(TripId(1)).origin(), y);
    }

    #[test]
    fn buckets_are_sorted_by_departure() {
        let graph = build(&[
            row(1, "A", "X", "Y", "12:00:00", "12:05:00"),
            row(2, "A", "X", "Y", "06:00:00", "06:05:00"),
            row(3, "A", "X", "Y", "23:59:00", "00:04:00"),
            row(4, "A", "X", "Y", "09:30:00", "09:35:00"),
        ]);

        assert_eq!(
            departures(&graph, "A", "X", "Y"),
            ["06:00:00", "09:30:00", "12:00:00", "23:59:00"]
        );
    }

    #[test]
    fn row_order_does_not_change_buckets() {
        let rows = vec![
            row(1, "A", "X", "Y", "12:00:00", "12:05:00"),
            row(2, "A", "X", "Y", "06:00:00", "06:05:00"),
            row(3, "B", "X", "Y", "07:00:00", "07:05:00"),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = build(&rows);
        let b = build(&reversed);
        assert_eq!(departures(&a, "A", "X", "Y"), departures(&b, "A", "X", "Y"));
        assert_eq!(departures(&a, "B", "X", "Y"), departures(&b, "B", "X", "Y"));
    }

    #[test]
    fn equal_departures_keep_fastest_trip() {
        let graph = build(&[
            row(1, "A", "X", "Y", "08:00:00", "08:20:00"),
            row(2, "A", "X", "Y", "08:00:00", "08:10:00"),
            row(3, "A", "X", "Y", "08:00:00", "08:15:00"),
        ]);

        let trips: Vec<&Trip> = graph.trips_between("A", "X", "Y").unwrap().collect();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].source_id(), 2);
        assert_eq!(graph.trip_count(), 1);
    }

    #[test]
    fn outgoing_lists_buckets_by_origin() {
        let graph = build(&[
            row(1, "A", "X", "Y", "08:00:00", "08:05:00"),
            row(2, "B", "X", "Z", "08:00:00", "08:05:00"),
            row(3, "A", "Y", "Z", "08:06:00", "08:10:00"),
        ]);

        let x = graph.stop_id("X").unwrap();
        let z = graph.stop_id("Z").unwrap();
        assert_eq!(graph.outgoing(x).len(), 2);
        assert!(graph.outgoing(z).is_empty());

        for &b in graph.outgoing(x) {
            assert_eq!(graph.bucket(b).origin(), x);
        }
    }

    #[test]
    fn lines_serving_has_no_repeats() {
        let graph = build(&[
            row(1, "A", "X", "Y", "08:00:00", "08:05:00"),
            row(2, "A", "X", "Z", "08:00:00", "08:05:00"),
            row(3, "B", "X", "Z", "08:06:00", "08:10:00"),
        ]);

        let x = graph.stop_id("X").unwrap();
        let lines: Vec<&str> = graph
            .lines_serving(x)
            .into_iter()
            .map(|l| graph.line_name(l))
            .collect();
        assert_eq!(lines, ["A", "B"]);
    }

    #[test]
    fn trips_between_unknown_names() {
        let graph = build(&[row(1, "A", "X", "Y", "08:00:00", "08:05:00")]);

        assert!(graph.trips_between("B", "X", "Y").is_none());
        assert!(graph.trips_between("A", "Y", "X").is_none());
        assert!(graph.trips_between("A", "X", "Nowhere").is_none());
    }

    #[test]
    fn inconsistent_coordinates_rejected() {
        let rows = vec![
            row(1, "A", "X", "Y", "08:00:00", "08:05:00")
                .with_coordinates((51.10, 17.00), (51.20, 17.10)),
            row(2, "A", "X", "Y", "09:00:00", "09:05:00")
                .with_coordinates((51.50, 17.00), (51.20, 17.10)),
        ];

        let err = TimetableGraph::build(&rows, &GraphConfig::default()).unwrap_err();
        let TimetableError::MalformedTimetable { trip_id, reason } = err;
        assert_eq!(trip_id, 2);
        assert!(reason.contains("inconsistent coordinates"));
    }

    #[test]
    fn small_coordinate_drift_tolerated() {
        let rows = vec![
            row(1, "A", "X", "Y", "08:00:00", "08:05:00")
                .with_coordinates((51.100, 17.000), (51.2, 17.1)),
            row(2, "B", "X", "Y", "09:00:00", "09:05:00")
                .with_coordinates((51.102, 17.001), (51.2, 17.1)),
        ];

        let graph = TimetableGraph::build(&rows, &GraphConfig::default()).unwrap();
        // First coordinates win
        assert_eq!(graph.stop_by_name("X").unwrap().lat(), 51.100);
    }

    #[test]
    fn strict_tolerance_rejects_drift() {
        let rows = vec![
            row(1, "A", "X", "Y", "08:00:00", "08:05:00")
                .with_coordinates((51.100, 17.000), (51.2, 17.1)),
            row(2, "B", "X", "Y", "09:00:00", "09:05:00")
                .with_coordinates((51.102, 17.001), (51.2, 17.1)),
        ];

        assert!(TimetableGraph::build(&rows, &GraphConfig::new(0.0)).is_err());
    }

    #[test]
    fn invalid_rows_rejected() {
        let config = GraphConfig::default();

        let rows = vec![row(1, "", "X", "Y", "08:00:00", "08:05:00")];
        assert!(TimetableGraph::build(&rows, &config).is_err());

        let rows = vec![row(1, "A", " ", "Y", "08:00:00", "08:05:00")];
        assert!(TimetableGraph::build(&rows, &config).is_err());

        let rows = vec![
            row(1, "A", "X", "Y", "08:00:00", "08:05:00").with_coordinates((91.0, 0.0), (0.0, 0.0)),
        ];
        assert!(TimetableGraph::build(&rows, &config).is_err());

        let rows = vec![
            row(1, "A", "X", "Y", "08:00:00", "08:05:00")
                .with_coordinates((0.0, 0.0), (0.0, f64::NAN)),
        ];
        assert!(TimetableGraph::build(&rows, &config).is_err());
    }

    #[test]
    fn leg_names_resolve() {
        let graph = build(&[row(1, "A", "X", "Y", "08:00:00", "08:05:00")]);
        let names = graph.leg_names(TripId(0));
        assert_eq!(&*names.line, "A");
        assert_eq!(&*names.origin, "X");
        assert_eq!(&*names.destination, "Y");
    }
}
