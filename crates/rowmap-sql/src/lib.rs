//! SQL statement building
//!
//! This crate handles:
//! - The injection-safety gate applied to every statement fragment
//! - Assembly of the five supported statement shapes
//! - Statements derived from a record type's schema
//!
//! Statements are plain strings; values are embedded as literals, not bound.

pub mod builder;
pub mod guard;
pub mod statements;

pub use builder::QueryBuilder;
pub use guard::{ensure_safe, is_safe, Fragment, UnsafeInputError};
pub use statements::{
    column_definitions, column_names, create_table_for, insert_for, table_name_for, value_list,
    StatementError,
};
