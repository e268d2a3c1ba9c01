//! Timetable ingestion and the immutable timetable graph.
//!
//! Rows come in through [`load_timetable_csv`] (or any other producer of
//! [`TimetableRow`]s) and are indexed once by [`TimetableGraph::build`].

mod error;
mod graph;
mod loader;
mod row;

pub use error::{LoadError, TimetableError};
pub use graph::{Bucket, BucketId, GraphConfig, TimetableGraph};
pub use loader::{load_timetable_csv, load_timetable_reader};
pub use row::TimetableRow;
