//! Record capability traits
//!
//! A record type exposes its fields in declaration order and lets callers
//! read and write them by position. The [`record!`](crate::record) and
//! [`sql_enum!`](crate::sql_enum) macros generate these impls.

use crate::schema::{FieldDescriptor, SemanticType};
use crate::value::FieldValue;

/// A structured type with a fixed, ordered set of named, typed fields
///
/// `Default` supplies the blank instance that reloaded values are written into.
pub trait Record: Default {
    /// Type name, used for file and table names
    const TYPE_NAME: &'static str;

    /// Field descriptors in declaration order
    ///
    /// Must return the same slice on every call.
    fn schema() -> &'static [FieldDescriptor];

    /// Read the field at `index`
    fn get(&self, index: usize) -> Option<FieldValue>;

    /// Overwrite the field at `index`
    fn set(&mut self, index: usize, value: FieldValue) -> Result<(), FieldAssignError>;
}

/// Failure to store a value into a record field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldAssignError {
    #[error("no field at position {index}")]
    OutOfRange { index: usize },

    #[error("field '{field}' cannot hold a {kind} value")]
    TypeMismatch { field: &'static str, kind: &'static str },
}

/// Conversion between a concrete field type and [`FieldValue`]
pub trait FieldKind: Sized {
    /// Whether the type can hold `Null`
    const NULLABLE: bool = false;

    fn semantic_type() -> SemanticType;

    fn to_value(&self) -> FieldValue;

    /// `None` when the value has the wrong kind or does not fit
    fn from_value(value: FieldValue) -> Option<Self>;
}

/// A fieldless enum stored by variant name
pub trait SqlEnum: Sized + Copy + 'static {
    /// Enum type name
    const NAME: &'static str;

    /// Every variant name, in declaration order
    const VARIANTS: &'static [&'static str];

    fn variant_name(&self) -> &'static str;

    fn from_variant(name: &str) -> Option<Self>;
}

impl FieldKind for i64 {
    fn semantic_type() -> SemanticType {
        SemanticType::Integer
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldKind for i32 {
    fn semantic_type() -> SemanticType {
        SemanticType::Integer
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(i64::from(*self))
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }
}

impl FieldKind for f64 {
    fn semantic_type() -> SemanticType {
        SemanticType::Float
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldKind for bool {
    fn semantic_type() -> SemanticType {
        SemanticType::Boolean
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldKind for String {
    fn semantic_type() -> SemanticType {
        SemanticType::Text
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Optional fields are nullable: `None` is written as an empty CSV token
/// and an empty token reads back as `None`. `Some("")` is written the same
/// way, so it also reads back as `None`.
impl<T: FieldKind> FieldKind for Option<T> {
    const NULLABLE: bool = true;

    fn semantic_type() -> SemanticType {
        T::semantic_type()
    }

    fn to_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Semantic type of an enum implementing [`SqlEnum`]
pub fn enum_semantic_type<E: SqlEnum>() -> SemanticType {
    SemanticType::Enumeration {
        name: E::NAME,
        variants: E::VARIANTS,
    }
}

/// Declare a fieldless enum stored by variant name
///
/// The first variant is the default.
///
/// ```
/// rowmap_core::sql_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Size {
///         Compact => "COMPACT",
///         FullSize => "FULL_SIZE",
///     }
/// }
///
/// use rowmap_core::SqlEnum;
/// assert_eq!(Size::FullSize.variant_name(), "FULL_SIZE");
/// assert_eq!(Size::default(), Size::Compact);
/// ```
#[macro_export]
macro_rules! sql_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident => $first_name:literal
            $(, $variant:ident => $variant_name:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis enum $name {
            #[default]
            $first,
            $($variant,)*
        }

        impl $crate::SqlEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [&'static str] = &[$first_name $(, $variant_name)*];

            fn variant_name(&self) -> &'static str {
                match self {
                    Self::$first => $first_name,
                    $(Self::$variant => $variant_name,)*
                }
            }

            fn from_variant(name: &str) -> Option<Self> {
                match name {
                    $first_name => Some(Self::$first),
                    $($variant_name => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        impl $crate::FieldKind for $name {
            fn semantic_type() -> $crate::SemanticType {
                $crate::record::enum_semantic_type::<Self>()
            }

            fn to_value(&self) -> $crate::FieldValue {
                $crate::FieldValue::Enum(
                    $crate::SqlEnum::variant_name(self).to_string()
                )
            }

            fn from_value(value: $crate::FieldValue) -> Option<Self> {
                match value {
                    $crate::FieldValue::Enum(name) => {
                        <Self as $crate::SqlEnum>::from_variant(&name)
                    }
                    _ => None,
                }
            }
        }
    };
}

/// Declare a struct and implement [`Record`] for it
///
/// Every field type must implement [`FieldKind`] and `Default`. The
/// schema is built once per type.
///
/// ```
/// rowmap_core::record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Point {
///         pub x: i64,
///         pub y: i64,
///     }
/// }
///
/// use rowmap_core::Record;
/// let names: Vec<_> = Point::schema().iter().map(|f| f.name).collect();
/// assert_eq!(names, ["x", "y"]);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn schema() -> &'static [$crate::FieldDescriptor] {
                static SCHEMA: ::std::sync::OnceLock<::std::vec::Vec<$crate::FieldDescriptor>> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::std::vec![
                        $($crate::FieldDescriptor::of::<$ty>(stringify!($field)),)+
                    ]
                })
            }

            fn get(&self, index: usize) -> Option<$crate::FieldValue> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some($crate::FieldKind::to_value(&self.$field));
                    }
                    position += 1;
                )+
                let _ = position;
                None
            }

            fn set(
                &mut self,
                index: usize,
                value: $crate::FieldValue,
            ) -> Result<(), $crate::FieldAssignError> {
                let mut position = 0usize;
                $(
                    if index == position {
                        let kind = value.kind();
                        self.$field = <$ty as $crate::FieldKind>::from_value(value).ok_or(
                            $crate::FieldAssignError::TypeMismatch {
                                field: stringify!($field),
                                kind,
                            },
                        )?;
                        return Ok(());
                    }
                    position += 1;
                )+
                let _ = position;
                Err($crate::FieldAssignError::OutOfRange { index })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::sql_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Make {
            Chevy => "CHEVY",
            Ford => "FORD",
            Toyota => "TOYOTA",
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Car {
            make: Make,
            seats: i32,
            weight: f64,
            plate: Option<String>,
        }
    }

    #[test]
    fn enum_default_is_first_variant() {
        assert_eq!(Make::default(), Make::Chevy);
        assert_eq!(Make::VARIANTS, &["CHEVY", "FORD", "TOYOTA"]);
        assert_eq!(Make::from_variant("TOYOTA"), Some(Make::Toyota));
        assert_eq!(Make::from_variant("toyota"), None);
    }

    #[test]
    fn get_reads_fields_by_position() {
        let car = Car {
            make: Make::Ford,
            seats: 5,
            weight: 2600.0,
            plate: None,
        };

        assert_eq!(car.get(0), Some(FieldValue::Enum("FORD".into())));
        assert_eq!(car.get(1), Some(FieldValue::Integer(5)));
        assert_eq!(car.get(2), Some(FieldValue::Float(2600.0)));
        assert_eq!(car.get(3), Some(FieldValue::Null));
        assert_eq!(car.get(4), None);
    }

    #[test]
    fn set_writes_fields_by_position() {
        let mut car = Car::default();
        car.set(0, FieldValue::Enum("TOYOTA".into())).unwrap();
        car.set(1, FieldValue::Integer(7)).unwrap();
        car.set(3, FieldValue::Text("ABC-123".into())).unwrap();

        assert_eq!(car.make, Make::Toyota);
        assert_eq!(car.seats, 7);
        assert_eq!(car.plate.as_deref(), Some("ABC-123"));
    }

    #[test]
    fn set_rejects_wrong_kind_and_position() {
        let mut car = Car::default();
        assert_eq!(
            car.set(1, FieldValue::Text("five".into())),
            Err(FieldAssignError::TypeMismatch { field: "seats", kind: "text" })
        );
        assert_eq!(
            car.set(9, FieldValue::Null),
            Err(FieldAssignError::OutOfRange { index: 9 })
        );
        assert_eq!(car, Car::default());
    }

    #[test]
    fn integer_overflow_does_not_fit_i32() {
        assert_eq!(i32::from_value(FieldValue::Integer(i64::MAX)), None);
        assert_eq!(i64::from_value(FieldValue::Integer(i64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn nullable_descriptor() {
        let fields = Car::schema();
        assert!(!fields[0].nullable);
        assert!(fields[3].nullable);
        assert_eq!(fields[3].semantic_type, SemanticType::Text);
    }
}
