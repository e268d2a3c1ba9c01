//! Rendering of planned routes.
//!
//! Plain-text output through `Display`, and serializable transfer objects
//! for JSON output.

use std::fmt;

use serde::Serialize;

use crate::domain::{Itinerary, Leg};
use crate::planner::Tour;

/// Format seconds as `1h 05m 00s`, dropping the hours when zero.
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

fn write_leg(f: &mut fmt::Formatter<'_>, leg: &Leg) -> fmt::Result {
    write!(
        f,
        "  [{}] {} {} -> {} {}",
        leg.line(),
        leg.origin(),
        leg.departure_time(),
        leg.destination(),
        leg.arrival_time()
    )?;
    if leg.wait_secs() > 0 {
        write!(f, " (wait {})", format_duration(u64::from(leg.wait_secs())))?;
    }
    writeln!(f)
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} -> {} at {} ({})",
            self.origin(),
            self.destination(),
            self.reference(),
            self.criterion()
        )?;

        if self.is_empty() {
            writeln!(f, "  already there")?;
        }
        for leg in self.legs() {
            write_leg(f, leg)?;
        }

        write!(
            f,
            "Arrive {} after {}, {} line change(s), cost {}",
            self.arrival_time(),
            format_duration(u64::from(self.total_duration_secs())),
            self.change_count(),
            self.cost()
        )
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Visiting order: {}", self.order().join(", "))?;
        for (i, hop) in self.hops().iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Hop {}: {hop}", i + 1)?;
        }
        writeln!(f)?;
        write!(
            f,
            "Back at {} after {}, cost {}",
            self.arrival_time(),
            format_duration(self.total_duration_secs()),
            self.cost()
        )
    }
}

/// A planned route.
#[derive(Debug, Serialize)]
pub struct ItineraryDto {
    /// Start stop name
    pub origin: String,

    /// Goal stop name
    pub destination: String,

    /// Criterion the search minimized ("time" or "changes")
    pub criterion: String,

    /// Time the traveller was ready (HH:MM:SS)
    pub reference: String,

    /// Arrival time at the goal (HH:MM:SS)
    pub arrival_time: String,

    /// Seconds from the reference to arrival
    pub duration_secs: u32,

    /// Number of line changes
    pub changes: usize,

    /// Minimized objective (seconds or transfer units)
    pub cost: u64,

    /// Rides in order
    pub legs: Vec<LegDto>,
}

/// One ride in a route.
#[derive(Debug, Serialize)]
pub struct LegDto {
    /// Trip id from the timetable source
    pub trip_id: u64,

    /// Operating company
    pub operator: String,

    /// Line name
    pub line: String,

    /// Boarding stop name
    pub from: String,

    /// Alighting stop name
    pub to: String,

    /// Departure time (HH:MM:SS)
    pub departure_time: String,

    /// Arrival time (HH:MM:SS)
    pub arrival_time: String,

    /// Seconds spent waiting before boarding
    pub wait_secs: u32,
}

/// A planned round trip.
#[derive(Debug, Serialize)]
pub struct TourDto {
    /// Visited stops in order, without the start
    pub order: Vec<String>,

    /// Time the traveller was ready at the start (HH:MM:SS)
    pub reference: String,

    /// Time of return to the start (HH:MM:SS)
    pub arrival_time: String,

    /// Seconds from the reference to return
    pub duration_secs: u64,

    /// Sum of hop costs
    pub cost: u64,

    /// One route per hop
    pub hops: Vec<ItineraryDto>,
}

// Conversion implementations

impl ItineraryDto {
    /// Create from a domain Itinerary.
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            origin: itinerary.origin().to_string(),
            destination: itinerary.destination().to_string(),
            criterion: itinerary.criterion().to_string(),
            reference: itinerary.reference().to_string(),
            arrival_time: itinerary.arrival_time().to_string(),
            duration_secs: itinerary.total_duration_secs(),
            changes: itinerary.change_count(),
            cost: itinerary.cost(),
            legs: itinerary.legs().iter().map(LegDto::from_leg).collect(),
        }
    }
}

impl LegDto {
    /// Create from a domain Leg.
    pub fn from_leg(leg: &Leg) -> Self {
        Self {
            trip_id: leg.source_id(),
            operator: leg.operator().to_string(),
            line: leg.line().to_string(),
            from: leg.origin().to_string(),
            to: leg.destination().to_string(),
            departure_time: leg.departure_time().to_string(),
            arrival_time: leg.arrival_time().to_string(),
            wait_secs: leg.wait_secs(),
        }
    }
}

impl TourDto {
    /// Create from a planned Tour.
    pub fn from_tour(tour: &Tour) -> Self {
        Self {
            order: tour.order().to_vec(),
            reference: tour.reference().to_string(),
            arrival_time: tour.arrival_time().to_string(),
            duration_secs: tour.total_duration_secs(),
            cost: tour.cost(),
            hops: tour.hops().iter().map(ItineraryDto::from_itinerary).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::TimeOfDay;
    use crate::planner::{Planner, SearchConfig, SearchRequest};
    use crate::timetable::{GraphConfig, TimetableGraph, TimetableRow};

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn planner() -> Planner {
        let rows = vec![
            TimetableRow::new(1, "A", "Rynek", "Dworzec", t("08:00:00"), t("08:10:00")),
            TimetableRow::new(2, "K", "Dworzec", "Biskupin", t("08:15:00"), t("08:25:00")),
        ];
        let graph = TimetableGraph::build(&rows, &GraphConfig::default()).unwrap();
        Planner::new(Arc::new(graph), SearchConfig::default())
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0m 00s");
        assert_eq!(format_duration(780), "13m 00s");
        assert_eq!(format_duration(86_940), "24h 09m 00s");
    }

    #[test]
    fn itinerary_text() {
        let itinerary = planner()
            .search(&SearchRequest::new("Rynek", "Biskupin", t("07:58:00")))
            .unwrap();
        let text = itinerary.to_string();

        assert_eq!(
            text,
            "Rynek -> Biskupin at 07:58:00 (time)\n\
             \x20 [A] Rynek 08:00:00 -> Dworzec 08:10:00 (wait 2m 00s)\n\
             \x20 [K] Dworzec 08:15:00 -> Biskupin 08:25:00 (wait 5m 00s)\n\
             Arrive 08:25:00 after 27m 00s, 1 line change(s), cost 1620"
        );
    }

    #[test]
    fn empty_itinerary_text() {
        let itinerary = planner()
            .search(&SearchRequest::new("Rynek", "Rynek", t("08:00:00")))
            .unwrap();
        assert!(itinerary.to_string().contains("already there"));
    }

    #[test]
    fn itinerary_json() {
        let itinerary = planner()
            .search(&SearchRequest::new("Rynek", "Biskupin", t("08:00:00")))
            .unwrap();
        let json = serde_json::to_value(ItineraryDto::from_itinerary(&itinerary)).unwrap();

        assert_eq!(json["cost"], 1500);
        assert_eq!(json["changes"], 1);
        assert_eq!(json["arrival_time"], "08:25:00");
        assert_eq!(json["legs"][1]["line"], "K");
        assert_eq!(json["legs"][1]["wait_secs"], 300);
        assert_eq!(json["legs"][0]["trip_id"], 1);
    }
}
