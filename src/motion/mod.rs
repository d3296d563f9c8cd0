//! Motion module for antenna-rotator.
//!
//! Provides motion profile planning and deadline-driven step scheduling.

mod executor;
mod profile;

pub use executor::{MotionExecutor, Tick};
pub use profile::{Direction, MotionProfile, MAX_DURATION_US};
