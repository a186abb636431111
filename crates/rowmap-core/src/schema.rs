//! Field descriptors and record schema introspection

use crate::record::Record;
use serde::Serialize;
use std::collections::HashSet;

/// Logical kind of a record field
///
/// Independent of the concrete Rust type that stores the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SemanticType {
    /// Whole number
    Integer,

    /// Floating point number
    Float,

    /// Boolean flag
    Boolean,

    /// Free text
    Text,

    /// Closed set of named variants
    Enumeration {
        /// Enum type name
        name: &'static str,

        /// Every variant name, in declaration order
        variants: &'static [&'static str],
    },

    /// A type with no CSV or SQL mapping
    Other {
        type_name: &'static str,
    },
}

impl SemanticType {
    /// Longest variant name, counted in characters (0 for non-enumerations)
    pub fn longest_variant(&self) -> usize {
        match self {
            Self::Enumeration { variants, .. } => variants
                .iter()
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Text => write!(f, "text"),
            Self::Enumeration { name, .. } => write!(f, "enum {}", name),
            Self::Other { type_name } => write!(f, "{}", type_name),
        }
    }
}

/// A named, typed field of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDescriptor {
    /// Field name, used as the CSV header and SQL column name
    pub name: &'static str,

    /// Semantic type
    pub semantic_type: SemanticType,

    /// Whether the field can hold `Null`
    pub nullable: bool,
}

impl FieldDescriptor {
    /// Create a non-nullable descriptor
    pub const fn new(name: &'static str, semantic_type: SemanticType) -> Self {
        Self {
            name,
            semantic_type,
            nullable: false,
        }
    }

    /// Describe a field stored as `T`
    pub fn of<T: crate::record::FieldKind>(name: &'static str) -> Self {
        Self {
            name,
            semantic_type: T::semantic_type(),
            nullable: T::NULLABLE,
        }
    }

    /// Mark the descriptor as nullable
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Ordered view over the fields of a record type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordSchema {
    /// Record type name
    pub type_name: &'static str,

    /// Fields in declaration order
    pub fields: &'static [FieldDescriptor],
}

impl RecordSchema {
    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a schema returned by [`describe`]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find a field by name
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// Introspection failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectionError {
    #[error("record type '{type_name}' exposes no fields")]
    EmptySchema { type_name: &'static str },

    #[error("record type '{type_name}' declares field '{field}' more than once")]
    DuplicateField {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Describe the fields of a record type
///
/// The returned order is the declaration order and is stable for the
/// lifetime of the process.
pub fn describe<R: Record>() -> Result<RecordSchema, IntrospectionError> {
    let fields = R::schema();

    if fields.is_empty() {
        return Err(IntrospectionError::EmptySchema {
            type_name: R::TYPE_NAME,
        });
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.name) {
            return Err(IntrospectionError::DuplicateField {
                type_name: R::TYPE_NAME,
                field: field.name,
            });
        }
    }

    Ok(RecordSchema {
        type_name: R::TYPE_NAME,
        fields,
    })
}
