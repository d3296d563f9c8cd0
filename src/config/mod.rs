//! Configuration module for antenna-rotator.
//!
//! Provides types for loading and validating axis and magnetometer
//! configuration from TOML files (with `std` feature) or pre-built values.

mod axis;
mod magnetometer;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{AxisConfig, AxisKind, PinAssignment};
pub use magnetometer::{reg, MagnetometerConfig};
pub use system::{AxisId, RotatorConfig};
pub use validation::validate_config;
pub(crate) use validation::validate_axis;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, Microsteps};
