//! Timetable error types.

use crate::domain::TimeError;

/// Errors that abort graph construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimetableError {
    /// The rows contradict each other or carry unusable values
    #[error("malformed timetable (trip {trip_id}): {reason}")]
    MalformedTimetable { trip_id: u64, reason: String },
}

impl TimetableError {
    pub(crate) fn malformed(trip_id: u64, reason: impl Into<String>) -> Self {
        TimetableError::MalformedTimetable {
            trip_id,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when reading a timetable file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV structure or a numeric field is invalid
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A departure or arrival field is not a clock time
    #[error("record {record}: invalid time {value:?}: {source}")]
    InvalidTime {
        record: usize,
        value: String,
        #[source]
        source: TimeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TimetableError::malformed(17, "stop Rynek has inconsistent coordinates");
        assert_eq!(
            err.to_string(),
            "malformed timetable (trip 17): stop Rynek has inconsistent coordinates"
        );

        let err = LoadError::InvalidTime {
            record: 3,
            value: "8:0".into(),
            source: crate::domain::TimeOfDay::parse("8:0").unwrap_err(),
        };
        assert_eq!(
            err.to_string(),
            "record 3: invalid time \"8:0\": invalid time: expected HH:MM:SS format"
        );
    }
}
