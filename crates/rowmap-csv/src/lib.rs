//! CSV persistence for rowmap records
//!
//! Serializes any [`rowmap_core::Record`] sequence to a header-plus-rows
//! document and reloads it positionally, skipping rows that fail to decode.

pub mod io;
pub mod table;

pub use io::{CsvSink, CsvSource, FileSink, FileSource, LineSource, OpenMode};
pub use table::{CsvError, CsvTable, LoadReport, RowError, WriteSummary};
