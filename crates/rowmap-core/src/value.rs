//! Runtime field values

use serde::{Deserialize, Serialize};

/// The runtime value of a single record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    /// Absent value
    Null,

    Integer(i64),

    Float(f64),

    Boolean(bool),

    Text(String),

    /// Enumeration value, held by variant name
    Enum(String),
}

impl FieldValue {
    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
        }
    }
}

/// Natural text form: the CSV token of the value
impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{}", v),
            // Debug keeps a fractional part on whole numbers: 2600.0, not 2600
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Text(v) | Self::Enum(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_natural_text() {
        assert_eq!(FieldValue::Integer(-42).to_string(), "-42");
        assert_eq!(FieldValue::Float(2600.0).to_string(), "2600.0");
        assert_eq!(FieldValue::Float(153.25).to_string(), "153.25");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
        assert_eq!(FieldValue::Text("Main St".into()).to_string(), "Main St");
        assert_eq!(FieldValue::Enum("CHEVY".into()).to_string(), "CHEVY");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn value_serialization() {
        let json = serde_json::to_string(&FieldValue::Enum("FORD".into())).unwrap();
        assert_eq!(json, r#"{"kind":"enum","value":"FORD"}"#);
    }
}
