//! Time-of-day handling for timetable data.
//!
//! Timetables give departures and arrivals as "HH:MM:SS" clock values with
//! no date attached. A ride that leaves at 23:50 and arrives at 00:10 still
//! takes twenty minutes, so all elapsed-time arithmetic wraps forward past
//! midnight.

use chrono::{NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Number of seconds in one day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A validated time of day with second resolution.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::TimeOfDay;
///
/// let t = TimeOfDay::parse("08:15:30").unwrap();
/// assert_eq!(t.seconds_from_midnight(), 8 * 3600 + 15 * 60 + 30);
/// assert_eq!(t.to_string(), "08:15:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Midnight, 00:00:00.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(NaiveTime::MIN);

    /// Create a time from its components, or `None` if any is out of range.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self)
    }

    /// Create a time from seconds since midnight, wrapping whole days away.
    pub fn from_seconds(secs: u32) -> Self {
        let secs = secs % SECONDS_PER_DAY;
        // In range after the modulo, so the fallback never triggers.
        Self(NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Parse a strict "HH:MM:SS" time with the hour in 0-23.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TimeOfDay;
    ///
    /// assert!(TimeOfDay::parse("00:00:00").is_ok());
    /// assert!(TimeOfDay::parse("23:59:59").is_ok());
    ///
    /// assert!(TimeOfDay::parse("24:00:00").is_err());
    /// assert!(TimeOfDay::parse("12:60:00").is_err());
    /// assert!(TimeOfDay::parse("12:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let (hour, minute, second) = parse_fields(s)?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        Self::from_hms(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Parse "HH:MM:SS", wrapping hours of 24 and above onto the next day.
    ///
    /// Timetable exports write after-midnight departures of a service day
    /// as "24:05:00", "25:10:00" and so on.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TimeOfDay;
    ///
    /// let t = TimeOfDay::parse_normalized("24:05:00").unwrap();
    /// assert_eq!(t.to_string(), "00:05:00");
    /// ```
    pub fn parse_normalized(s: &str) -> Result<Self, TimeError> {
        let (hour, minute, second) = parse_fields(s)?;
        Self::from_hms(hour % 24, minute, second).ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// Seconds elapsed since midnight.
    pub fn seconds_from_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }

    /// Returns the underlying chrono time.
    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Move forward by `secs`, wrapping past midnight.
    pub fn add_seconds(&self, secs: u64) -> Self {
        let wrapped = (secs % u64::from(SECONDS_PER_DAY)) as u32;
        Self::from_seconds(self.seconds_from_midnight() + wrapped)
    }

    /// Seconds from `self` forward to `later`; see [`elapsed_seconds`].
    pub fn seconds_until(&self, later: TimeOfDay) -> u32 {
        elapsed_seconds(*self, later)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Seconds from `start` forward to `end` on a 24-hour clock.
///
/// When `end` is numerically earlier than `start` it is taken to be on the
/// following day. The result is always in `[0, 86400)`.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::{TimeOfDay, elapsed_seconds};
///
/// let a = TimeOfDay::parse("23:59:59").unwrap();
/// let b = TimeOfDay::parse("00:00:01").unwrap();
/// assert_eq!(elapsed_seconds(a, b), 2);
/// assert_eq!(elapsed_seconds(b, a), 86_398);
/// assert_eq!(elapsed_seconds(a, a), 0);
/// ```
pub fn elapsed_seconds(start: TimeOfDay, end: TimeOfDay) -> u32 {
    let start = start.seconds_from_midnight();
    let end = end.seconds_from_midnight();
    if end >= start {
        end - start
    } else {
        SECONDS_PER_DAY - (start - end)
    }
}

/// Split "H:MM:SS" or "HH:MM:SS" into numeric fields.
///
/// Minutes and seconds are range-checked here; the hour is left to the
/// caller, which decides whether values past 23 are an error.
fn parse_fields(s: &str) -> Result<(u32, u32, u32), TimeError> {
    let mut parts = s.trim().split(':');
    let (Some(h), Some(m), Some(sec), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TimeError::new("expected HH:MM:SS format"));
    };

    if h.is_empty() || h.len() > 2 || !h.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::new("invalid hour digits"));
    }
    let hour: u32 = h.parse().map_err(|_| TimeError::new("invalid hour digits"))?;

    let minute =
        parse_two_digits(m.as_bytes()).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second =
        parse_two_digits(sec.as_bytes()).ok_or_else(|| TimeError::new("invalid second digits"))?;
    if second > 59 {
        return Err(TimeError::new("second must be 0-59"));
    }

    Ok((hour, minute, second))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
