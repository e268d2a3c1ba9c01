//! Remaining-time estimates for A* search.
//!
//! A heuristic guesses how many seconds are left from a stop to the goal.
//! The search stays optimal only when the guess never exceeds the true
//! remaining time; nothing here checks that, it is up to the caller to pick
//! a speed that bounds every vehicle in the timetable.

use std::fmt;
use std::str::FromStr;

use crate::domain::Stop;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude.
const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Estimates the seconds needed to get from one stop to another.
pub trait Heuristic: Send + Sync {
    /// Non-negative estimate in seconds.
    fn estimate(&self, from: &Stop, goal: &Stop) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(&Stop, &Stop) -> f64 + Send + Sync,
{
    fn estimate(&self, from: &Stop, goal: &Stop) -> f64 {
        self(from, goal)
    }
}

/// Always estimates zero, turning A* back into plain Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _from: &Stop, _goal: &Stop) -> f64 {
        0.0
    }
}

/// How coordinate differences are turned into a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Sum of north-south and east-west distances.
    Manhattan,
    /// Straight line on a local flat projection.
    Euclidean,
    /// Larger of the north-south and east-west distances.
    Chebyshev,
    /// Great-circle distance.
    Haversine,
}

/// Error returned when parsing an unknown metric name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown heuristic {0:?}: expected manhattan, euclidean, chebyshev or haversine")]
pub struct InvalidMetric(String);

impl FromStr for Metric {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Metric::Manhattan),
            "euclidean" => Ok(Metric::Euclidean),
            "chebyshev" => Ok(Metric::Chebyshev),
            "haversine" => Ok(Metric::Haversine),
            _ => Err(InvalidMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Manhattan => "manhattan",
            Metric::Euclidean => "euclidean",
            Metric::Chebyshev => "chebyshev",
            Metric::Haversine => "haversine",
        };
        f.write_str(name)
    }
}

impl Metric {
    /// Distance in metres between two stops.
    pub fn distance_m(self, a: &Stop, b: &Stop) -> f64 {
        match self {
            Metric::Manhattan => {
                let (dx, dy) = planar_offsets_m(a, b);
                dx + dy
            }
            Metric::Euclidean => {
                let (dx, dy) = planar_offsets_m(a, b);
                dx.hypot(dy)
            }
            Metric::Chebyshev => {
                let (dx, dy) = planar_offsets_m(a, b);
                dx.max(dy)
            }
            Metric::Haversine => haversine_m(a, b),
        }
    }
}

/// East-west and north-south distances on an equirectangular projection.
fn planar_offsets_m(a: &Stop, b: &Stop) -> (f64, f64) {
    let mean_lat = ((a.lat() + b.lat()) / 2.0).to_radians();
    let dy = (a.lat() - b.lat()).abs() * METRES_PER_DEGREE;
    let dx = (a.lon() - b.lon()).abs() * METRES_PER_DEGREE * mean_lat.cos();
    (dx, dy)
}

fn haversine_m(a: &Stop, b: &Stop) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distance to the goal divided by an assumed top speed.
///
/// With [`Metric::Euclidean`], [`Metric::Haversine`] or
/// [`Metric::Chebyshev`] the estimate never exceeds the true remaining time
/// as long as no vehicle is faster than the given speed. [`Metric::Manhattan`]
/// is longer than the straight line and can overestimate.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::Stop;
/// use transit_planner::planner::{DistanceHeuristic, Heuristic, Metric};
///
/// let a = Stop::new("Rynek", 51.11, 17.03);
/// let b = Stop::new("Dworzec", 51.10, 17.04);
///
/// let fast = DistanceHeuristic::new(Metric::Euclidean, 60.0);
/// let slow = DistanceHeuristic::new(Metric::Euclidean, 30.0);
/// assert!(fast.estimate(&a, &b) < slow.estimate(&a, &b));
/// assert_eq!(fast.estimate(&a, &a), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DistanceHeuristic {
    metric: Metric,
    speed_mps: f64,
}

impl DistanceHeuristic {
    /// Estimate with `metric`, assuming no vehicle beats `speed_kmh`.
    pub fn new(metric: Metric, speed_kmh: f64) -> Self {
        Self {
            metric,
            speed_mps: speed_kmh / 3.6,
        }
    }

    /// The metric distances are measured with.
    pub fn metric(&self) -> Metric {
        self.metric
    }
}

impl Heuristic for DistanceHeuristic {
    fn estimate(&self, from: &Stop, goal: &Stop) -> f64 {
        if self.speed_mps <= 0.0 {
            return 0.0;
        }
        self.metric.distance_m(from, goal) / self.speed_mps
    }
}

/// Whole seconds the engine adds to a priority: floored, with negative and
/// NaN estimates treated as zero.
pub(crate) fn whole_seconds(heuristic: &dyn Heuristic, from: &Stop, goal: &Stop) -> u64 {
    let estimate = heuristic.estimate(from, goal);
    if estimate.is_nan() || estimate <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast
    estimate.floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(lat: f64, lon: f64) -> Stop {
        Stop::new("S", lat, lon)
    }

    #[test]
    fn zero_heuristic() {
        let a = stop(51.0, 17.0);
        let b = stop(52.0, 18.0);
        assert_eq!(ZeroHeuristic.estimate(&a, &b), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = stop(51.0, 17.0);
        let b = stop(52.0, 17.0);

        for metric in [
            Metric::Manhattan,
            Metric::Euclidean,
            Metric::Chebyshev,
            Metric::Haversine,
        ] {
            let d = metric.distance_m(&a, &b);
            assert!((d - 111_195.0).abs() < 10.0, "{metric}: {d}");
        }
    }

    #[test]
    fn metrics_are_ordered() {
        let a = stop(51.10, 17.00);
        let b = stop(51.12, 17.05);

        let manhattan = Metric::Manhattan.distance_m(&a, &b);
        let euclidean = Metric::Euclidean.distance_m(&a, &b);
        let chebyshev = Metric::Chebyshev.distance_m(&a, &b);
        let haversine = Metric::Haversine.distance_m(&a, &b);

        assert!(chebyshev <= euclidean);
        assert!(euclidean <= manhattan);
        // Flat projection is close to the great circle at city scale
        assert!((euclidean - haversine).abs() / haversine < 0.01);
    }

    #[test]
    fn distance_over_speed() {
        let a = stop(51.0, 17.0);
        let b = stop(52.0, 17.0);

        // 111 km at 36 km/h (10 m/s)
        let h = DistanceHeuristic::new(Metric::Haversine, 36.0);
        let secs = h.estimate(&a, &b);
        assert!((secs - 11_119.5).abs() < 1.0);
    }

    #[test]
    fn non_positive_speed_estimates_zero() {
        let a = stop(51.0, 17.0);
        let b = stop(52.0, 17.0);
        assert_eq!(DistanceHeuristic::new(Metric::Euclidean, 0.0).estimate(&a, &b), 0.0);
    }

    #[test]
    fn closures_are_heuristics() {
        let a = stop(51.0, 17.0);
        let b = stop(52.0, 17.0);
        let h = |_: &Stop, _: &Stop| 42.5;

        assert_eq!(h.estimate(&a, &b), 42.5);
        assert_eq!(whole_seconds(&h, &a, &b), 42);
    }

    #[test]
    fn whole_seconds_clamps_bad_estimates() {
        let a = stop(51.0, 17.0);

        assert_eq!(whole_seconds(&|_: &Stop, _: &Stop| -5.0, &a, &a), 0);
        assert_eq!(whole_seconds(&|_: &Stop, _: &Stop| f64::NAN, &a, &a), 0);
        assert_eq!(whole_seconds(&|_: &Stop, _: &Stop| 0.999, &a, &a), 0);
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("Haversine".parse::<Metric>().unwrap(), Metric::Haversine);
        assert_eq!("manhattan".parse::<Metric>().unwrap(), Metric::Manhattan);
        assert!("taxicab".parse::<Metric>().is_err());
        assert_eq!(Metric::Chebyshev.to_string(), "chebyshev");
    }
}
