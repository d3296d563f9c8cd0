//! # antenna-rotator
//!
//! Open-loop azimuth/elevation antenna rotator control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Timed stepping**: Angle and time budget become evenly spaced STEP pulses on absolute deadlines
//! - **Circular azimuth**: Remaining travel always takes the short way round
//! - **Compass feedback**: Averaged, calibrated magnetometer heading for absolute azimuth
//! - **Manual override**: Encoder jogging that preempts automatic motion safely
//! - **Configuration-driven**: Axes and magnetometer defined in TOML files
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use antenna_rotator::{AxisArbiter, AxisEngine, AxisId, Degrees, Rotator, RotatorConfig};
//!
//! static AZ_ARBITER: AxisArbiter = AxisArbiter::new(500);
//! static EL_ARBITER: AxisArbiter = AxisArbiter::new(500);
//!
//! let config: RotatorConfig = antenna_rotator::load_config("rotator.toml")?;
//!
//! let azimuth = AxisEngine::builder()
//!     .from_config(&config, AxisId::Azimuth)
//!     .enable_pin(az_en)
//!     .dir_pin(az_dir)
//!     .step_pin(az_step)
//!     .delay(delay)
//!     .clock(clock)
//!     .arbiter(&AZ_ARBITER)
//!     .build()?;
//!
//! // ... elevation likewise ...
//!
//! let mut rotator = Rotator::from_config(&config, azimuth, elevation, i2c)?;
//! rotator.turn_to_azimuth(Degrees(135.0))?;
//! ```
//!
//! Button edges go to the axis arbiter from the GPIO interrupt
//! ([`AxisArbiter::on_button_edge`]); the main loop then calls
//! [`Rotator::service_manual`] to run the jog. To keep one axis stepping
//! while the other jogs, [`Rotator::split`] the controller and drive each
//! channel from its own context.
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and [`StdClock`]
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible in every module
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod hal;
pub mod jog;
pub mod motion;
pub mod rotator;
pub mod sensor;

// Re-exports for ergonomic API
pub use axis::{
    AxisArbiter, AxisEngine, AxisEngineBuilder, AxisMode, AxisState, EdgeAction, LineOwner,
    StepperAxis, TickOutcome,
};
pub use config::{validate_config, AxisConfig, AxisId, AxisKind, MagnetometerConfig, RotatorConfig};
pub use error::{Error, Result};
pub use hal::{AxisPins, Clock, EncoderInputs, EncoderPins};
pub use jog::{JogPoll, JogReport, JogState, ManualOverride};
pub use motion::{Direction, MotionProfile};
pub use rotator::{AzimuthChannel, ElevationChannel, Rotator};
pub use sensor::{HeadingSample, HeadingSensor};

#[cfg(feature = "std")]
pub use hal::StdClock;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, DegreesPerSec, Microsteps};
