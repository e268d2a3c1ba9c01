//! Per-reference-time views of trip offsets.
//!
//! A trip's offset is the number of seconds from a search's reference time
//! until the trip departs, wrapped at 24 hours. Buckets are sorted by clock
//! departure, so for a given reference each bucket splits into trips
//! departing later today (offsets ascending from 0) followed by trips that
//! only run again tomorrow (offsets ascending from the wrap). Recording the
//! split point is enough to walk any bucket in offset order.
//!
//! Indices are immutable once built and cached per reference time, so two
//! searches with different references never see each other's offsets.

use std::sync::Arc;

use moka::sync::Cache as MokaCache;
use tracing::trace;

use crate::domain::{SECONDS_PER_DAY, TimeOfDay, TripId};
use crate::timetable::{BucketId, TimetableGraph};

/// The trip chosen to leave a stop through one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Boarding {
    pub(crate) trip: TripId,
    pub(crate) departure_offset: u32,
    pub(crate) arrival_offset: u32,
}

/// Bucket split points for one reference time.
#[derive(Debug)]
pub(crate) struct OffsetIndex {
    reference: TimeOfDay,
    /// Per bucket, the position of the first trip departing at or after
    /// the reference clock time.
    splits: Vec<u32>,
}

impl OffsetIndex {
    pub(crate) fn build(graph: &TimetableGraph, reference: TimeOfDay) -> Self {
        let splits = (0..graph.bucket_count())
            .map(|b| {
                let trips = graph.bucket(BucketId(b as u32)).trips();
                trips.partition_point(|&t| graph.trip(t).departure() < reference) as u32
            })
            .collect();

        Self { reference, splits }
    }

    pub(crate) fn reference(&self) -> TimeOfDay {
        self.reference
    }

    /// Trips of `bucket` whose offset is at least `earliest`, in ascending
    /// offset order, paired with that offset.
    ///
    /// Offsets never reach a full day, so nothing is usable once `earliest`
    /// is a day or more past the reference.
    pub(crate) fn usable<'g>(
        &self,
        graph: &'g TimetableGraph,
        bucket: BucketId,
        earliest: u32,
    ) -> impl Iterator<Item = (TripId, u32)> + 'g {
        let trips = graph.bucket(bucket).trips();
        let split = self.splits[bucket.index()] as usize;
        let reference = self.reference;
        let ref_secs = reference.seconds_from_midnight();

        let (today, tomorrow): (&'g [TripId], &'g [TripId]) = if earliest >= SECONDS_PER_DAY {
            (&[], &[])
        } else if ref_secs + earliest < SECONDS_PER_DAY {
            let ready = TimeOfDay::from_seconds(ref_secs + earliest);
            let p = trips.partition_point(|&t| graph.trip(t).departure() < ready);
            (&trips[p..], &trips[..split])
        } else {
            let ready = TimeOfDay::from_seconds(ref_secs + earliest - SECONDS_PER_DAY);
            let wrapped = &trips[..split];
            let p = wrapped.partition_point(|&t| graph.trip(t).departure() < ready);
            (&wrapped[p..], &[])
        };

        today
            .iter()
            .chain(tomorrow)
            .map(move |&t| (t, graph.trip(t).offset_from(reference)))
    }

    /// The trip of `bucket` that reaches its destination first when the
    /// traveller is ready `earliest` seconds after the reference.
    ///
    /// Trips in a bucket need not arrive in departure order (an express can
    /// overtake a stopping service), so the scan continues until a trip
    /// departs no earlier than the best arrival found.
    pub(crate) fn best_boarding(
        &self,
        graph: &TimetableGraph,
        bucket: BucketId,
        earliest: u32,
    ) -> Option<Boarding> {
        let mut best: Option<Boarding> = None;

        for (trip, offset) in self.usable(graph, bucket, earliest) {
            if best.is_some_and(|b| offset >= b.arrival_offset) {
                break;
            }
            let arrival_offset = offset + graph.trip(trip).duration();
            if best.is_none_or(|b| arrival_offset < b.arrival_offset) {
                best = Some(Boarding {
                    trip,
                    departure_offset: offset,
                    arrival_offset,
                });
            }
        }

        best
    }
}

/// Bounded cache of offset indices keyed by reference time.
pub(crate) struct OffsetCache {
    indices: MokaCache<TimeOfDay, Arc<OffsetIndex>>,
}

impl OffsetCache {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            indices: MokaCache::builder().max_capacity(capacity).build(),
        }
    }

    /// The index for `reference`, built on first use.
    pub(crate) fn get(&self, graph: &TimetableGraph, reference: TimeOfDay) -> Arc<OffsetIndex> {
        self.indices.get_with(reference, || {
            trace!(%reference, "Building offset index");
            Arc::new(OffsetIndex::build(graph, reference))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{GraphConfig, TimetableRow};

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    /// One bucket X→Y on line A with the given (departure, arrival) pairs.
    fn graph(trips: &[(&str, &str)]) -> TimetableGraph {
        let rows: Vec<TimetableRow> = trips
            .iter()
            .enumerate()
            .map(|(i, (dep, arr))| TimetableRow::new(i as u64, "A", "X", "Y", t(dep), t(arr)))
            .collect();
        TimetableGraph::build(&rows, &GraphConfig::default()).unwrap()
    }

    fn offsets(index: &OffsetIndex, graph: &TimetableGraph, earliest: u32) -> Vec<u32> {
        index
            .usable(graph, BucketId(0), earliest)
            .map(|(_, offset)| offset)
            .collect()
    }

    #[test]
    fn usable_trips_wrap_to_next_day() {
        let g = graph(&[
            ("06:00:00", "06:10:00"),
            ("09:00:00", "09:10:00"),
            ("12:00:00", "12:10:00"),
        ]);
        let index = OffsetIndex::build(&g, t("08:00:00"));

        assert_eq!(offsets(&index, &g, 0), [3600, 4 * 3600, 22 * 3600]);
        assert_eq!(offsets(&index, &g, 3601), [4 * 3600, 22 * 3600]);
        assert_eq!(offsets(&index, &g, 22 * 3600), [22 * 3600]);
        assert!(offsets(&index, &g, 22 * 3600 + 1).is_empty());
    }

    #[test]
    fn departure_at_reference_is_usable() {
        let g = graph(&[("08:00:00", "08:10:00")]);
        let index = OffsetIndex::build(&g, t("08:00:00"));

        assert_eq!(offsets(&index, &g, 0), [0]);
        assert!(offsets(&index, &g, 1).is_empty());
    }

    #[test]
    fn ready_after_midnight_only_sees_early_trips() {
        let g = graph(&[
            ("00:30:00", "00:40:00"),
            ("05:00:00", "05:10:00"),
            ("23:30:00", "23:40:00"),
        ]);
        let index = OffsetIndex::build(&g, t("23:00:00"));

        // Ready at 01:00 the next day
        let usable = offsets(&index, &g, 2 * 3600);
        assert_eq!(usable, [6 * 3600]);
    }

    #[test]
    fn nothing_usable_after_a_full_day() {
        let g = graph(&[("08:00:00", "08:10:00")]);
        let index = OffsetIndex::build(&g, t("07:00:00"));

        assert!(offsets(&index, &g, SECONDS_PER_DAY).is_empty());
    }

    #[test]
    fn best_boarding_prefers_earliest_arrival() {
        // The 08:05 express overtakes the 08:00 stopping service
        let g = graph(&[
            ("08:00:00", "08:40:00"),
            ("08:05:00", "08:20:00"),
            ("08:30:00", "08:35:00"),
        ]);
        let index = OffsetIndex::build(&g, t("08:00:00"));

        let boarding = index.best_boarding(&g, BucketId(0), 0).unwrap();
        assert_eq!(boarding.departure_offset, 300);
        assert_eq!(boarding.arrival_offset, 1200);
        assert_eq!(g.trip(boarding.trip).source_id(), 1);
    }

    #[test]
    fn best_boarding_none_when_empty() {
        let g = graph(&[("08:00:00", "08:10:00")]);
        let index = OffsetIndex::build(&g, t("08:00:00"));

        assert!(index.best_boarding(&g, BucketId(0), SECONDS_PER_DAY).is_none());
    }

    #[test]
    fn cache_keeps_references_apart() {
        let g = graph(&[("09:00:00", "09:10:00")]);
        let cache = OffsetCache::new(4);

        let morning = cache.get(&g, t("08:00:00"));
        let evening = cache.get(&g, t("20:00:00"));

        assert_eq!(morning.reference(), t("08:00:00"));
        assert_eq!(offsets(&morning, &g, 0), [3600]);
        assert_eq!(offsets(&evening, &g, 0), [13 * 3600]);

        let again = cache.get(&g, t("08:00:00"));
        assert!(Arc::ptr_eq(&morning, &again));
    }
}
