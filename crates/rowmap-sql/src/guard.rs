//! Injection-safety gate for SQL fragments
//!
//! This is a denylist, not a sanitizer: it rejects fragments containing a
//! statement separator (`;`) or a double quote, and blank fragments. Anything
//! else passes, including single quotes and comments. Fragments that fail are
//! rejected, never rewritten.

use regex::Regex;
use std::sync::OnceLock;

/// Which statement argument a fragment was supplied as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    TableName,
    ColumnDefinitions,
    Columns,
    Values,
    WhereClause,
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableName => write!(f, "table name"),
            Self::ColumnDefinitions => write!(f, "column definitions"),
            Self::Columns => write!(f, "columns"),
            Self::Values => write!(f, "values"),
            Self::WhereClause => write!(f, "where clause"),
        }
    }
}

/// A fragment that failed the safety gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsafe SQL input detected in the {fragment}")]
pub struct UnsafeInputError {
    pub fragment: Fragment,
}

fn denied() -> &'static Regex {
    static DENIED: OnceLock<Regex> = OnceLock::new();
    DENIED.get_or_init(|| Regex::new(r#"[;"]"#).expect("denylist pattern is valid"))
}

/// True iff the fragment is non-blank and contains neither `;` nor `"`
pub fn is_safe(fragment: &str) -> bool {
    !fragment.trim().is_empty() && !denied().is_match(fragment)
}

/// Gate a fragment, naming the argument on failure
pub fn ensure_safe(fragment: Fragment, value: &str) -> Result<(), UnsafeInputError> {
    if is_safe(value) {
        Ok(())
    } else {
        tracing::warn!(%fragment, "rejected unsafe SQL fragment");
        Err(UnsafeInputError { fragment })
    }
}
