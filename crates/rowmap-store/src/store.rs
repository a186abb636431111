//! Record store: runs built statements on an engine and logs each one

use crate::executor::{ExecError, ExecOutcome, ResultSet, SqlExecutor};
use crate::log::CommandLog;
use rowmap_core::{Diagnostic, DiagnosticCode, Record, Severity};
use rowmap_sql::{create_table_for, insert_for, QueryBuilder, StatementError, UnsafeInputError};

/// Errors from store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error(transparent)]
    Unsafe(#[from] UnsafeInputError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Failed to write command log: {0}")]
    Log(#[from] std::io::Error),
}

impl StoreError {
    /// Report this failure as a `COMMAND_FAILED` error diagnostic
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CommandFailed, Severity::Error, self.to_string())
    }
}

/// Orchestrates statement building and execution against one engine
pub struct RecordStore<E: SqlExecutor> {
    executor: E,
    log: Option<CommandLog>,
}

impl<E: SqlExecutor> RecordStore<E> {
    pub fn new(executor: E) -> Self {
        Self { executor, log: None }
    }

    /// Record every statement and its outcome in `log`
    pub fn with_log(mut self, log: CommandLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn log(&self) -> Option<&CommandLog> {
        self.log.as_ref()
    }

    fn record(&self, message: &str) -> Result<(), StoreError> {
        if let Some(log) = &self.log {
            log.record(message)?;
        }
        Ok(())
    }

    /// Run one statement
    ///
    /// Engine failures are logged and returned, never swallowed.
    pub async fn execute(&self, statement: &str) -> Result<ExecOutcome, StoreError> {
        tracing::debug!(engine = self.executor.name(), %statement, "executing statement");
        self.record(&format!("Executing command: {}", statement))?;

        match self.executor.execute(statement).await {
            Ok(outcome) => {
                match &outcome {
                    ExecOutcome::Rows(rows) => {
                        tracing::debug!(rows = rows.len(), "query returned");
                        self.record("Command executed successfully (query)")?;
                    }
                    ExecOutcome::Affected { count } => {
                        tracing::debug!(affected = count, "update applied");
                        self.record(&format!(
                            "Command executed successfully (update), affected rows: {}",
                            count
                        ))?;
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(%statement, error = %e, "command failed");
                self.record(&format!("There was an issue executing the command: {}", e))?;
                Err(e.into())
            }
        }
    }

    /// Create `table` with one column per field of `R`
    pub async fn create_table<R: Record>(&self, table: &str) -> Result<(), StoreError> {
        let statement = create_table_for::<R>(table)?;
        self.execute(&statement).await?;
        Ok(())
    }

    /// Insert every record, one statement each, and return the rows affected
    ///
    /// All statements are built before any runs, so an unsafe value aborts
    /// the batch without touching the table.
    pub async fn insert_all<R: Record>(&self, table: &str, records: &[R]) -> Result<u64, StoreError> {
        let statements = records
            .iter()
            .map(|record| insert_for(table, record))
            .collect::<Result<Vec<_>, _>>()?;

        let mut total = 0;
        for statement in &statements {
            if let ExecOutcome::Affected { count } = self.execute(statement).await? {
                total += count;
            }
        }

        tracing::info!(table, rows = total, "inserted records");
        Ok(total)
    }

    /// Rows of `table`; a blank `where_clause` selects everything
    pub async fn select(
        &self,
        table: &str,
        columns: &str,
        where_clause: &str,
    ) -> Result<ResultSet, StoreError> {
        let statement = QueryBuilder::select(table, columns, where_clause)?;

        match self.execute(&statement).await? {
            ExecOutcome::Rows(rows) => Ok(rows),
            ExecOutcome::Affected { .. } => Ok(ResultSet::default()),
        }
    }

    /// Delete matching rows; a blank `where_clause` deletes everything
    pub async fn delete(&self, table: &str, where_clause: &str) -> Result<u64, StoreError> {
        let statement = QueryBuilder::delete(table, where_clause)?;

        match self.execute(&statement).await? {
            ExecOutcome::Affected { count } => Ok(count),
            ExecOutcome::Rows(_) => Ok(0),
        }
    }

    pub async fn drop_table(&self, table: &str) -> Result<(), StoreError> {
        let statement = QueryBuilder::drop_table(table)?;
        self.execute(&statement).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryExecutor;
    use pretty_assertions::assert_eq;
    use rowmap_sql::Fragment;
    use tempfile::TempDir;

    rowmap_core::sql_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Color {
            Red => "RED",
            Green => "GREEN",
        }
    }

    rowmap_core::record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Widget {
            color: Color,
            stock: i64,
            label: String,
        }
    }

    fn widget(color: Color, stock: i64, label: &str) -> Widget {
        Widget {
            color,
            stock,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn typed_operations_against_memory_engine() {
        let store = RecordStore::new(MemoryExecutor::new());
        store.create_table::<Widget>("Widgets").await.unwrap();

        let inserted = store
            .insert_all(
                "Widgets",
                &[widget(Color::Red, 3, "bolt"), widget(Color::Green, 7, "nut")],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let rows = store.select("Widgets", "*", "stock > 5").await.unwrap();
        assert_eq!(rows.render(), "GREEN 7 nut\n");

        assert_eq!(store.delete("Widgets", "color = 'RED'").await.unwrap(), 1);
        assert_eq!(store.select("Widgets", "label", "").await.unwrap().render(), "nut\n");

        store.drop_table("Widgets").await.unwrap();
        assert!(!store.executor().has_table("Widgets").await);
    }

    #[tokio::test]
    async fn unsafe_value_aborts_batch_before_execution() {
        let store = RecordStore::new(MemoryExecutor::new());
        store.create_table::<Widget>("Widgets").await.unwrap();

        let err = store
            .insert_all(
                "Widgets",
                &[widget(Color::Red, 1, "ok"), widget(Color::Red, 2, "bad; DROP TABLE Widgets")],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Statement(StatementError::Unsafe(UnsafeInputError {
                fragment: Fragment::Values
            }))
        ));
        assert_eq!(store.executor().row_count("Widgets").await, Some(0));
    }

    #[tokio::test]
    async fn engine_errors_are_returned_and_logged() {
        let dir = TempDir::new().unwrap();
        let log = CommandLog::open(dir.path().join("database_log.txt")).unwrap();
        let store = RecordStore::new(MemoryExecutor::new()).with_log(log);

        let err = store.drop_table("Widgets").await.unwrap_err();
        assert!(matches!(err, StoreError::Exec(ExecError::TableNotFound(_))));

        let diagnostic = err.diagnostic();
        assert_eq!(diagnostic.code, DiagnosticCode::CommandFailed);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.to_string(), "error [COMMAND_FAILED] Table not found: Widgets");

        let contents = store.log().unwrap().contents().unwrap();
        assert!(contents.contains("Executing command: DROP TABLE Widgets"));
        assert!(contents.contains("There was an issue executing the command: Table not found: Widgets"));
    }

    #[tokio::test]
    async fn log_records_query_and_update_outcomes() {
        let dir = TempDir::new().unwrap();
        let log = CommandLog::open(dir.path().join("database_log.txt")).unwrap();
        let store = RecordStore::new(MemoryExecutor::new()).with_log(log);

        store.create_table::<Widget>("Widgets").await.unwrap();
        store
            .insert_all("Widgets", &[widget(Color::Green, 1, "cog")])
            .await
            .unwrap();
        store.select("Widgets", "*", "").await.unwrap();

        let contents = store.log().unwrap().contents().unwrap();
        let messages: Vec<&str> = contents
            .lines()
            .map(|line| line.split_once("] ").map(|(_, m)| m).unwrap_or(line))
            .collect();

        assert_eq!(
            messages,
            vec![
                "Executing command: CREATE TABLE Widgets (color VARCHAR(10), stock INTEGER, label VARCHAR(255))",
                "Command executed successfully (update), affected rows: 0",
                "Executing command: INSERT INTO Widgets (color, stock, label) VALUES ('GREEN', 1, 'cog')",
                "Command executed successfully (update), affected rows: 1",
                "Executing command: SELECT * FROM Widgets",
                "Command executed successfully (query)",
            ]
        );
    }

    #[tokio::test]
    async fn blank_table_name_is_rejected() {
        let store = RecordStore::new(MemoryExecutor::new());

        assert!(matches!(
            store.select("", "*", "").await,
            Err(StoreError::Unsafe(UnsafeInputError {
                fragment: Fragment::TableName
            }))
        ));
    }
}
