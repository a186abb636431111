//! Field value codec: CSV tokens and SQL literals
//!
//! Tokens are not escaped. A text value containing a comma produces an
//! extra column on reload, and a text value containing a single quote
//! produces a broken SQL literal. Callers must gate untrusted text before
//! building statements from it.

use crate::record::Record;
use crate::schema::{FieldDescriptor, SemanticType};
use crate::value::FieldValue;

/// Why a token could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    InvalidInteger,
    InvalidFloat,
    UnknownVariant,
    UnsupportedType,
}

impl std::fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInteger => write!(f, "not a base-10 integer"),
            Self::InvalidFloat => write!(f, "not a decimal number"),
            Self::UnknownVariant => write!(f, "not a known variant"),
            Self::UnsupportedType => write!(f, "type has no text form"),
        }
    }
}

/// A CSV token that cannot be parsed into its field's semantic type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode '{raw_token}' for field '{field}': {reason}")]
pub struct DecodeError {
    pub field: String,
    pub raw_token: String,
    pub reason: DecodeFailure,
}

impl DecodeError {
    fn new(field: &FieldDescriptor, raw_token: &str, reason: DecodeFailure) -> Self {
        Self {
            field: field.name.to_string(),
            raw_token: raw_token.to_string(),
            reason,
        }
    }
}

/// CSV token for a value
///
/// `Null` becomes the empty token.
pub fn to_csv_token(value: &FieldValue) -> String {
    value.to_string()
}

/// Decode a CSV token into a value of the field's semantic type
///
/// Booleans parse leniently: anything other than a case-insensitive
/// `true` is `false`. Enumeration tokens are trimmed before lookup.
pub fn from_csv_token(field: &FieldDescriptor, token: &str) -> Result<FieldValue, DecodeError> {
    if field.nullable && token.is_empty() {
        return Ok(FieldValue::Null);
    }

    match field.semantic_type {
        SemanticType::Integer => token
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| DecodeError::new(field, token, DecodeFailure::InvalidInteger)),
        SemanticType::Float => token
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| DecodeError::new(field, token, DecodeFailure::InvalidFloat)),
        SemanticType::Boolean => Ok(FieldValue::Boolean(token.eq_ignore_ascii_case("true"))),
        SemanticType::Text => Ok(FieldValue::Text(token.to_string())),
        SemanticType::Enumeration { variants, .. } => {
            let trimmed = token.trim();
            variants
                .iter()
                .find(|v| **v == trimmed)
                .map(|v| FieldValue::Enum(v.to_string()))
                .ok_or_else(|| DecodeError::new(field, token, DecodeFailure::UnknownVariant))
        }
        SemanticType::Other { .. } => Err(DecodeError::new(field, token, DecodeFailure::UnsupportedType)),
    }
}

/// SQL literal for a value
///
/// Text and enumeration values are single-quoted, everything else is bare.
pub fn to_sql_literal(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "NULL".to_string(),
        FieldValue::Text(v) | FieldValue::Enum(v) => format!("'{}'", v),
        other => other.to_string(),
    }
}

/// CSV tokens for every field of a record, in schema order
pub fn record_tokens<R: Record>(record: &R) -> Vec<String> {
    (0..R::schema().len())
        .map(|i| record.get(i).map(|v| to_csv_token(&v)).unwrap_or_default())
        .collect()
}

/// SQL literals for every field of a record, in schema order
pub fn record_literals<R: Record>(record: &R) -> Vec<String> {
    (0..R::schema().len())
        .map(|i| to_sql_literal(&record.get(i).unwrap_or(FieldValue::Null)))
        .collect()
}
