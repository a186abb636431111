//! Vehicle records used by the demo pipeline

use rowmap_core::SqlEnum;

rowmap_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Make {
        Chevy => "CHEVY",
        Ford => "FORD",
        Toyota => "TOYOTA",
        Nissan => "NISSAN",
        Hyundai => "HYUNDAI",
    }
}

rowmap_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Size {
        Compact => "COMPACT",
        Intermediate => "INTERMEDIATE",
        FullSize => "FULL_SIZE",
    }
}

impl Size {
    /// Weight range in pounds, upper bound exclusive
    pub fn weight_range(self) -> (f64, f64) {
        match self {
            Self::Compact => (1500.0, 2000.0),
            Self::Intermediate => (2000.0, 2500.0),
            Self::FullSize => (2500.0, 4500.0),
        }
    }
}

rowmap_core::record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Vehicle {
        pub make: Make,
        pub size: Size,
        pub weight: f64,
        pub engine_size: f64,
    }
}

/// Engine size range, upper bound exclusive
const ENGINE_SIZE_RANGE: (f64, f64) = (100.0, 200.0);

/// Weight range for a size name that matches no size
const ANY_WEIGHT_RANGE: (f64, f64) = (1500.0, 4500.0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleError {
    #[error("Invalid make: {0}")]
    InvalidMake(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

/// A random variant name of `E`
fn pick<E: SqlEnum>() -> &'static str {
    let names = E::VARIANTS;
    names[fastrand::usize(..names.len())]
}

fn weight_range_for(size: &str) -> (f64, f64) {
    Size::from_variant(&size.to_ascii_uppercase())
        .map(Size::weight_range)
        .unwrap_or(ANY_WEIGHT_RANGE)
}

fn within((low, high): (f64, f64)) -> f64 {
    low + fastrand::f64() * (high - low)
}

/// Build a vehicle from make and size names (case-insensitive)
pub fn create_vehicle(
    make: &str,
    size: &str,
    weight: f64,
    engine_size: f64,
) -> Result<Vehicle, VehicleError> {
    let make = Make::from_variant(&make.to_ascii_uppercase())
        .ok_or_else(|| VehicleError::InvalidMake(make.to_string()))?;
    let size = Size::from_variant(&size.to_ascii_uppercase())
        .ok_or_else(|| VehicleError::InvalidSize(size.to_string()))?;

    Ok(Vehicle {
        make,
        size,
        weight,
        engine_size,
    })
}

/// A vehicle with random make and size, and a weight that fits the size
pub fn random_vehicle() -> Result<Vehicle, VehicleError> {
    let make = pick::<Make>();
    let size = pick::<Size>();

    create_vehicle(
        make,
        size,
        within(weight_range_for(size)),
        within(ENGINE_SIZE_RANGE),
    )
}
