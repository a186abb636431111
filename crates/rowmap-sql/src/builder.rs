//! SQL statement assembly
//!
//! Every builder gates its fragments before assembling anything, so a
//! failure never yields a partial statement. Identifiers and value lists are
//! used exactly as supplied.

use crate::guard::{ensure_safe, Fragment, UnsafeInputError};

/// Builds CREATE TABLE, DROP TABLE, SELECT, INSERT and DELETE statements
pub struct QueryBuilder;

impl QueryBuilder {
    /// `CREATE TABLE <table> (<column_defs>)`
    pub fn create_table(table: &str, column_defs: &str) -> Result<String, UnsafeInputError> {
        ensure_safe(Fragment::TableName, table)?;
        ensure_safe(Fragment::ColumnDefinitions, column_defs)?;

        Ok(format!("CREATE TABLE {} ({})", table, column_defs))
    }

    /// `DROP TABLE <table>`
    pub fn drop_table(table: &str) -> Result<String, UnsafeInputError> {
        ensure_safe(Fragment::TableName, table)?;

        Ok(format!("DROP TABLE {}", table))
    }

    /// `SELECT <columns> FROM <table> [WHERE <where_clause>]`
    ///
    /// A blank `where_clause` omits the WHERE keyword and is not gated.
    pub fn select(table: &str, columns: &str, where_clause: &str) -> Result<String, UnsafeInputError> {
        ensure_safe(Fragment::TableName, table)?;
        ensure_safe(Fragment::Columns, columns)?;

        if where_clause.trim().is_empty() {
            return Ok(format!("SELECT {} FROM {}", columns, table));
        }

        ensure_safe(Fragment::WhereClause, where_clause)?;
        Ok(format!("SELECT {} FROM {} WHERE {}", columns, table, where_clause))
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<values>)`
    pub fn insert(table: &str, columns: &str, values: &str) -> Result<String, UnsafeInputError> {
        ensure_safe(Fragment::TableName, table)?;
        ensure_safe(Fragment::Columns, columns)?;
        ensure_safe(Fragment::Values, values)?;

        Ok(format!("INSERT INTO {} ({}) VALUES ({})", table, columns, values))
    }

    /// `DELETE FROM <table> [WHERE <where_clause>]`
    ///
    /// A blank `where_clause` deletes every row and is not gated.
    pub fn delete(table: &str, where_clause: &str) -> Result<String, UnsafeInputError> {
        ensure_safe(Fragment::TableName, table)?;

        if where_clause.trim().is_empty() {
            return Ok(format!("DELETE FROM {}", table));
        }

        ensure_safe(Fragment::WhereClause, where_clause)?;
        Ok(format!("DELETE FROM {} WHERE {}", table, where_clause))
    }
}
