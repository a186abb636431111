//! Execution engine trait for running statement strings

use serde::Serialize;

/// Whether a statement reads rows or changes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Leading keyword is `SELECT`
    Query,

    /// Anything else
    Update,
}

impl StatementKind {
    /// Classify a statement by its leading keyword
    pub fn classify(statement: &str) -> Self {
        match statement.split_whitespace().next() {
            Some(keyword) if keyword.eq_ignore_ascii_case("SELECT") => Self::Query,
            _ => Self::Update,
        }
    }
}

/// Rows returned by a query, with every cell in text form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    /// Column names, in result order
    pub columns: Vec<String>,

    /// Row cells; `None` is SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` in the column called `column` (case-insensitive)
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// One line per row, cells separated by spaces
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("null"))
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

/// Result of executing one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExecOutcome {
    /// A query's rows
    Rows(ResultSet),

    /// Number of rows an update affected
    Affected { count: u64 },
}

/// Errors that can occur when executing a statement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unsupported statement: {0}")]
    Unsupported(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    QueryError(String),
}

/// A relational engine that runs statement strings
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Engine name (e.g., "Memory", "SQLite")
    fn name(&self) -> &'static str;

    /// Run one statement
    ///
    /// Queries return [`ExecOutcome::Rows`]; everything else returns
    /// [`ExecOutcome::Affected`].
    async fn execute(&self, statement: &str) -> Result<ExecOutcome, ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_leading_keyword() {
        assert_eq!(StatementKind::classify("SELECT * FROM t"), StatementKind::Query);
        assert_eq!(StatementKind::classify("  select 1"), StatementKind::Query);
        assert_eq!(StatementKind::classify("INSERT INTO t (a) VALUES (1)"), StatementKind::Update);
        assert_eq!(StatementKind::classify("SELECTED"), StatementKind::Update);
        assert_eq!(StatementKind::classify(""), StatementKind::Update);
    }

    #[test]
    fn render_and_lookup() {
        let mut rs = ResultSet::new(vec!["make".into(), "weight".into()]);
        rs.rows.push(vec![Some("CHEVY".into()), Some("2600.0".into())]);
        rs.rows.push(vec![Some("FORD".into()), None]);

        assert_eq!(rs.render(), "CHEVY 2600.0\nFORD null\n");
        assert_eq!(rs.get(0, "WEIGHT"), Some("2600.0"));
        assert_eq!(rs.get(1, "weight"), None);
        assert_eq!(rs.get(5, "make"), None);
        assert_eq!(rs.len(), 2);
    }
}
