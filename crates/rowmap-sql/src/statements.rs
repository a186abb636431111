//! Statements derived from a record type's schema

use crate::builder::QueryBuilder;
use crate::guard::UnsafeInputError;
use rowmap_core::codec::record_literals;
use rowmap_core::type_map::{self, UnsupportedTypeError};
use rowmap_core::{describe, IntrospectionError, Record};

/// Failure to derive a statement from a record type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatementError {
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),

    #[error(transparent)]
    Unsafe(#[from] UnsafeInputError),
}

/// Default table name: the pluralized type name
pub fn table_name_for<R: Record>() -> String {
    format!("{}s", R::TYPE_NAME)
}

/// `name TYPE, ...` for every field of `R`
pub fn column_definitions<R: Record>() -> Result<String, StatementError> {
    let schema = describe::<R>()?;
    Ok(type_map::column_definitions(&schema)?)
}

/// `name, ...` for every field of `R`
pub fn column_names<R: Record>() -> Result<String, StatementError> {
    let schema = describe::<R>()?;
    Ok(schema.field_names().join(", "))
}

/// SQL literals of every field of `record`, joined with `", "`
pub fn value_list<R: Record>(record: &R) -> String {
    record_literals(record).join(", ")
}

/// CREATE TABLE statement for `R`
pub fn create_table_for<R: Record>(table: &str) -> Result<String, StatementError> {
    let defs = column_definitions::<R>()?;
    Ok(QueryBuilder::create_table(table, &defs)?)
}

/// INSERT statement for one record
///
/// The value list passes the same gate as any other fragment, so a text
/// field containing `;` or `"` makes the whole statement fail.
pub fn insert_for<R: Record>(table: &str, record: &R) -> Result<String, StatementError> {
    let columns = column_names::<R>()?;
    Ok(QueryBuilder::insert(table, &columns, &value_list(record))?)
}
