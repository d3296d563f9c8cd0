//! Mutable axis state, owned by its engine.

use crate::config::units::Degrees;
use crate::motion::Direction;

use super::arbiter::LineOwner;

/// Which control path is driving the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// Lines parked, driver disabled.
    #[default]
    Idle,
    /// A motion profile is being stepped out.
    AutoMoving,
    /// The encoder jog loop holds the lines.
    ManualJog,
}

impl AxisMode {
    /// The line owner this mode corresponds to.
    pub fn line_owner(self) -> LineOwner {
        match self {
            AxisMode::Idle => LineOwner::Free,
            AxisMode::AutoMoving => LineOwner::Auto,
            AxisMode::ManualJog => LineOwner::Manual,
        }
    }

    /// State name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            AxisMode::Idle => "Idle",
            AxisMode::AutoMoving => "AutoMoving",
            AxisMode::ManualJog => "ManualJog",
        }
    }
}

/// Snapshot of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisState {
    /// Signed angle still to travel. In `(-180, 180]` on circular axes.
    pub remaining: Degrees,
    /// Direction currently set on the DIR line.
    pub direction: Direction,
    /// Whether the driver is enabled.
    pub enabled: bool,
    /// Active control path.
    pub mode: AxisMode,
}

impl AxisState {
    /// Whether a profile is in flight.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.mode == AxisMode::AutoMoving
    }
}
