//! Semantic type to SQL column type mapping

use crate::schema::{FieldDescriptor, RecordSchema, SemanticType};

/// Fixed width of text columns
pub const TEXT_COLUMN_WIDTH: usize = 255;

/// Narrowest column an enumeration is stored in
pub const ENUM_MIN_WIDTH: usize = 10;

/// A field whose semantic type has no SQL mapping
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}' has unsupported type '{type_name}'")]
pub struct UnsupportedTypeError {
    pub field: String,
    pub type_name: String,
}

impl UnsupportedTypeError {
    pub fn for_field(field: &FieldDescriptor) -> Self {
        Self {
            field: field.name.to_string(),
            type_name: field.semantic_type.to_string(),
        }
    }
}

/// Column width for an enumeration with the given variants
pub fn enum_column_width(variants: &[&str]) -> usize {
    variants
        .iter()
        .map(|v| v.chars().count())
        .fold(ENUM_MIN_WIDTH, usize::max)
}

/// SQL column type for a field
pub fn sql_type(field: &FieldDescriptor) -> Result<String, UnsupportedTypeError> {
    let ty = match field.semantic_type {
        SemanticType::Integer => "INTEGER".to_string(),
        SemanticType::Float => "DOUBLE".to_string(),
        SemanticType::Boolean => "BOOLEAN".to_string(),
        SemanticType::Text => format!("VARCHAR({})", TEXT_COLUMN_WIDTH),
        SemanticType::Enumeration { variants, .. } => {
            format!("VARCHAR({})", enum_column_width(variants))
        }
        SemanticType::Other { .. } => return Err(UnsupportedTypeError::for_field(field)),
    };
    Ok(ty)
}

/// `name TYPE` pairs for every field, joined with `", "`
///
/// Fails on the first unsupported field; no partial list is returned.
pub fn column_definitions(schema: &RecordSchema) -> Result<String, UnsupportedTypeError> {
    let defs = schema
        .fields
        .iter()
        .map(|field| sql_type(field).map(|ty| format!("{} {}", field.name, ty)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(defs.join(", "))
}
