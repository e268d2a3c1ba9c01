//! CSV timetable loader.
//!
//! # CSV format
//!
//! One row per trip between two consecutive stops. Columns are matched by
//! header name; extra columns are ignored.
//!
//! ```csv
//! id,company,line,departure_time,arrival_time,start_stop,end_stop,start_stop_lat,start_stop_lon,end_stop_lat,end_stop_lon
//! 0,MPK Autobusy,A,20:52:00,20:53:00,Zajezdnia Obornicka,Paprotna,51.148,17.021,51.150,17.022
//! 1,MPK Autobusy,A,24:05:00,24:06:00,Paprotna,Obornicka,51.150,17.022,51.152,17.022
//! ```
//!
//! Hours of 24 and above are wrapped onto the next day, so the second row
//! departs at 00:05:00.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::TimeOfDay;

use super::error::LoadError;
use super::row::TimetableRow;

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: u64,
    #[serde(default)]
    company: String,
    line: String,
    departure_time: String,
    arrival_time: String,
    start_stop: String,
    end_stop: String,
    start_stop_lat: f64,
    start_stop_lon: f64,
    end_stop_lat: f64,
    end_stop_lon: f64,
}

/// Load timetable rows from a CSV file.
pub fn load_timetable_csv(path: &Path) -> Result<Vec<TimetableRow>, LoadError> {
    let file = File::open(path)?;
    let rows = load_timetable_reader(file)?;
    debug!(path = %path.display(), rows = rows.len(), "Timetable loaded");
    Ok(rows)
}

/// Like [`load_timetable_csv`] but accepts any `Read` source.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use transit_planner::timetable::load_timetable_reader;
///
/// let csv = "id,company,line,departure_time,arrival_time,start_stop,end_stop,\
/// start_stop_lat,start_stop_lon,end_stop_lat,end_stop_lon\n\
/// 7,MPK,A,08:00:00,08:10:00,Rynek,Dworzec,51.11,17.03,51.10,17.04\n";
///
/// let rows = load_timetable_reader(Cursor::new(csv)).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].trip_id, 7);
/// assert_eq!(rows[0].destination, "Dworzec");
/// ```
pub fn load_timetable_reader<R: Read>(reader: R) -> Result<Vec<TimetableRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
        let record = result?;
        // 1-based, counting data records only
        let number = i + 1;

        rows.push(TimetableRow {
            trip_id: record.id,
            departure: parse_time(number, &record.departure_time)?,
            arrival: parse_time(number, &record.arrival_time)?,
            operator: record.company,
            line: record.line,
            origin: record.start_stop,
            destination: record.end_stop,
            origin_lat: record.start_stop_lat,
            origin_lon: record.start_stop_lon,
            destination_lat: record.end_stop_lat,
            destination_lon: record.end_stop_lon,
        });
    }

    Ok(rows)
}

fn parse_time(record: usize, value: &str) -> Result<TimeOfDay, LoadError> {
    TimeOfDay::parse_normalized(value).map_err(|source| LoadError::InvalidTime {
        record,
        value: value.to_string(),
        source,
    })
}
