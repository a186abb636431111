//! SQLite execution engine
//!
//! Runs statements on an embedded SQLite database, either a file or a
//! private in-memory database. SQLite accepts the generated DDL as written
//! (`DOUBLE` gets REAL affinity, `VARCHAR(n)` gets TEXT affinity) but does
//! not enforce declared widths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let engine = SqliteExecutor::open("cars.db")?;
//! engine.execute("CREATE TABLE Vehicles (make VARCHAR(10), weight DOUBLE)").await?;
//! ```

use crate::executor::{ExecError, ExecOutcome, ResultSet, SqlExecutor, StatementKind};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite execution engine
///
/// Clones share the same connection.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Open or create the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExecError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            ExecError::Connection(format!(
                "Failed to open SQLite database at {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    /// A fresh database that lives as long as this engine
    pub fn open_in_memory() -> Result<Self, ExecError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ExecError::Connection(format!("Failed to open in-memory SQLite database: {}", e))
        })?;

        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn run(conn: &Connection, statement: &str) -> Result<ExecOutcome, ExecError> {
        match StatementKind::classify(statement) {
            StatementKind::Query => query(conn, statement).map(ExecOutcome::Rows),
            StatementKind::Update => {
                let count = conn.execute(statement, []).map_err(map_error)?;
                Ok(ExecOutcome::Affected {
                    count: count as u64,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl SqlExecutor for SqliteExecutor {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    async fn execute(&self, statement: &str) -> Result<ExecOutcome, ExecError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ExecError::Connection("SQLite connection lock poisoned".to_string()))?;

        Self::run(&conn, statement)
    }
}

fn query(conn: &Connection, statement: &str) -> Result<ResultSet, ExecError> {
    let mut stmt = conn.prepare(statement).map_err(map_error)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let width = columns.len();

    let mut result = ResultSet::new(columns);
    let mut rows = stmt.query([]).map_err(map_error)?;
    while let Some(row) = rows.next().map_err(map_error)? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            cells.push(cell_text(row.get_ref(index).map_err(map_error)?));
        }
        result.rows.push(cells);
    }

    Ok(result)
}

/// Text form of a stored value; reals keep a fractional part (`2600.0`)
fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(format!("{:?}", v)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn map_error(error: rusqlite::Error) -> ExecError {
    let message = error.to_string();

    if let rusqlite::Error::SqliteFailure(failure, _) = &error {
        if failure.code == ErrorCode::ConstraintViolation {
            return ExecError::Constraint(message);
        }
    }

    if message.contains("no such table") {
        ExecError::TableNotFound(message)
    } else if message.contains("already exists") {
        ExecError::TableExists(message)
    } else if message.contains("no such column") {
        ExecError::ColumnNotFound(message)
    } else if message.contains("syntax error") || message.contains("incomplete input") {
        ExecError::Syntax(message)
    } else {
        ExecError::QueryError(message)
    }
}
