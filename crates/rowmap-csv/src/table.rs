//! Record sequences to and from CSV documents
//!
//! A document is a header line of field names followed by one line per
//! record. Lines are comma-joined without quoting.

use crate::io::{CsvSink, CsvSource, FileSink, FileSource};
use rowmap_core::codec::{self, DecodeError};
use rowmap_core::{
    describe, Diagnostic, DiagnosticCode, FieldAssignError, IntrospectionError, Record,
    RecordSchema, Severity,
};
use serde::Serialize;
use std::path::Path;

/// CSV errors that abort a whole save or load
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}

/// What a save wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Whether a header line was written
    pub wrote_header: bool,

    /// Data lines written
    pub rows: usize,
}

/// Records recovered from a document, plus one diagnostic per skipped line
#[derive(Debug, Clone)]
pub struct LoadReport<R> {
    pub records: Vec<R>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<R> LoadReport<R> {
    /// True when no line was skipped
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Failure to build one record from one line
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Assign(#[from] FieldAssignError),
}

impl RowError {
    fn code(&self) -> DiagnosticCode {
        match self {
            Self::Decode(_) => DiagnosticCode::RowDecodeFailed,
            Self::Assign(_) => DiagnosticCode::RowAssignFailed,
        }
    }
}

/// CSV serialization for any [`Record`] type
pub struct CsvTable;

impl CsvTable {
    /// Field names joined with `,`
    pub fn header_line(schema: &RecordSchema) -> String {
        schema.field_names().join(",")
    }

    /// Field tokens of one record joined with `,`
    pub fn record_line<R: Record>(record: &R) -> String {
        codec::record_tokens(record).join(",")
    }

    /// Default file name for a record type: the pluralized type name
    pub fn file_name<R: Record>() -> String {
        format!("{}s.csv", R::TYPE_NAME)
    }

    /// Write a header and one line per record to `sink`
    ///
    /// An empty slice writes nothing at all, not even a header.
    pub fn serialize<R: Record, S: CsvSink>(
        records: &[R],
        sink: &mut S,
    ) -> Result<WriteSummary, CsvError> {
        if records.is_empty() {
            tracing::info!(record_type = R::TYPE_NAME, "no records to save");
            return Ok(WriteSummary::default());
        }

        let schema = describe::<R>()?;
        sink.append(&Self::header_line(&schema))?;
        sink.append("\n")?;

        for record in records {
            let line = Self::record_line(record);
            tracing::debug!(%line, "saving record");
            sink.append(&line)?;
            sink.append("\n")?;
        }

        Ok(WriteSummary {
            wrote_header: true,
            rows: records.len(),
        })
    }

    /// Read records of type `R` from `source`
    ///
    /// The first line is skipped without being checked against the
    /// type's field names. Values are assigned by position: extra tokens
    /// are ignored and missing trailing tokens leave fields at their
    /// default. A line that fails to decode is skipped and reported in
    /// [`LoadReport::diagnostics`].
    pub fn deserialize<R: Record, S: CsvSource>(source: &mut S) -> Result<LoadReport<R>, CsvError> {
        let schema = describe::<R>()?;
        let lines = source.read_all_lines()?;

        let mut records = Vec::with_capacity(lines.len().saturating_sub(1));
        let mut diagnostics = Vec::new();

        for (index, line) in lines.iter().enumerate().skip(1) {
            let line_number = index + 1;

            match Self::decode_line::<R>(&schema, line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(line = line_number, error = %e, "skipping CSV row");
                    diagnostics.push(
                        Diagnostic::new(e.code(), Severity::Warn, e.to_string())
                            .with_line(line_number)
                            .with_raw(line.as_str()),
                    );
                }
            }
        }

        tracing::info!(
            record_type = R::TYPE_NAME,
            loaded = records.len(),
            skipped = diagnostics.len(),
            "loaded CSV records"
        );

        Ok(LoadReport { records, diagnostics })
    }

    /// Build one record from one data line
    pub fn decode_line<R: Record>(schema: &RecordSchema, line: &str) -> Result<R, RowError> {
        let tokens = split_tokens(line);
        let mut record = R::default();

        for (index, (field, token)) in schema.fields.iter().zip(tokens).enumerate() {
            let value = codec::from_csv_token(field, token)?;
            record.set(index, value)?;
        }

        Ok(record)
    }

    /// Save records to `<dir>/<TypeName>s.csv`
    ///
    /// An empty slice returns without touching the filesystem.
    pub fn save<R: Record>(records: &[R], dir: &Path) -> Result<WriteSummary, CsvError> {
        if records.is_empty() {
            tracing::info!(record_type = R::TYPE_NAME, "no records to save");
            return Ok(WriteSummary::default());
        }

        let mut sink = FileSink::open(dir.join(Self::file_name::<R>()))?;
        let summary = Self::serialize(records, &mut sink)?;
        sink.finish()?;

        tracing::info!(path = %sink.path().display(), rows = summary.rows, "saved CSV file");
        Ok(summary)
    }

    /// Load records from the file at `path`
    pub fn load<R: Record>(path: &Path) -> Result<LoadReport<R>, CsvError> {
        let mut source = FileSource::open(path)?;
        Self::deserialize(&mut source)
    }
}

/// Split a line on commas, dropping trailing empty tokens
///
/// A line with no content at all yields a single empty token.
fn split_tokens(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return vec![""];
    }

    let mut tokens: Vec<&str> = line.split(',').collect();
    while tokens.last() == Some(&"") {
        tokens.pop();
    }
    tokens
}
