//! rowmap core
//!
//! Record capability traits and the field-level mapping layer:
//! introspection, SQL type mapping and the value codec.

pub mod codec;
pub mod config;
pub mod diagnostic;
pub mod record;
pub mod schema;
pub mod type_map;
pub mod value;

pub use codec::{DecodeError, DecodeFailure};
pub use config::{Config, ConfigError, EngineConfig, EngineKind};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use record::{FieldAssignError, FieldKind, Record, SqlEnum};
pub use schema::{describe, FieldDescriptor, IntrospectionError, RecordSchema, SemanticType};
pub use type_map::{sql_type, UnsupportedTypeError};
pub use value::FieldValue;
