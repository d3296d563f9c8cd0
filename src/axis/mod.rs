//! Axis module for antenna-rotator.
//!
//! Provides the per-axis stepping engine, its state, and the ownership token
//! that keeps the automatic scheduler and the manual jog loop off each
//! other's lines.

mod arbiter;
mod builder;
mod engine;
mod state;

pub use arbiter::{AxisArbiter, EdgeAction, LineOwner};
pub use builder::AxisEngineBuilder;
pub use engine::AxisEngine;
pub use state::{AxisMode, AxisState};

use crate::config::units::Degrees;
use crate::config::AxisConfig;
use crate::error::Result;
use crate::motion::Direction;

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No profile in flight.
    Idle,
    /// Next step is due at `until_us`.
    Waiting {
        /// Absolute deadline of the next step.
        until_us: u64,
    },
    /// One step was emitted.
    Stepped,
    /// The profile finished and the driver was disabled.
    Completed {
        /// Steps emitted by the finished profile.
        steps: u32,
    },
    /// The manual override took the lines; the profile was discarded.
    Preempted,
}

/// Operations the controller and the jog loop need from an axis.
pub trait StepperAxis {
    /// Immutable drive parameters.
    fn config(&self) -> &AxisConfig;

    /// Current state snapshot.
    fn state(&self) -> &AxisState;

    /// Output rotation per STEP pulse.
    fn step_angle(&self) -> Degrees;

    /// Add `angle` to the remaining travel and (re)plan it over `duration_s`.
    fn move_for(&mut self, duration_s: f32, angle: Degrees) -> Result<()>;

    /// Advance the profile in flight by at most one step.
    fn tick(&mut self) -> Result<TickOutcome>;

    /// Current instant on the axis timeline.
    fn now_us(&mut self) -> u64;

    /// Sleep until `deadline_us`; returns immediately if it has passed.
    fn wait_until(&mut self, deadline_us: u64);

    /// Whether a button edge has handed the axis to the manual override.
    fn manual_requested(&self) -> bool;

    /// Take the lines for jogging, discarding any profile, and enable.
    fn begin_manual(&mut self) -> Result<()>;

    /// Emit one jog step in `direction`.
    fn jog_step(&mut self, direction: Direction) -> Result<()>;

    /// Disable and hand the lines back.
    fn end_manual(&mut self) -> Result<()>;

    /// Tick until the profile completes or is preempted, sleeping between
    /// deadlines.
    ///
    /// Returns the final outcome: `Idle`, `Completed` or `Preempted`.
    fn run_to_completion(&mut self) -> Result<TickOutcome> {
        loop {
            match self.tick()? {
                TickOutcome::Waiting { until_us } => self.wait_until(until_us),
                TickOutcome::Stepped => {}
                outcome => return Ok(outcome),
            }
        }
    }
}
