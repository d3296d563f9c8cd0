//! Motion profile calculation.
//!
//! A constant-rate profile: the requested angle is split into equal steps
//! spread evenly over the time budget.

use crate::config::units::Degrees;

/// Longest time budget a profile accepts, in microseconds (about 285 years).
///
/// Kept inside the range where `f64` holds whole microseconds exactly.
pub const MAX_DURATION_US: u64 = 1 << 53;

/// Direction of axis motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Positive angles (DIR high).
    #[default]
    Forward,
    /// Negative angles (DIR low).
    Reverse,
}

impl Direction {
    /// Direction of a signed angle; zero counts as forward.
    #[inline]
    pub fn from_angle(angle: Degrees) -> Self {
        if angle.0 < 0.0 {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Timed plan for traversing an angle.
///
/// Step `k` (1-based) is due at `start_us + k * increment_us`. Deadlines are
/// absolute so pulse and processing latency never accumulates into drift.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    /// Timeline instant the profile was planned at.
    pub start_us: u64,

    /// Time budget in microseconds.
    pub duration_us: u64,

    /// Time between consecutive steps in microseconds.
    pub increment_us: f64,

    /// Signed remaining angle when the profile was planned.
    pub angle_at_start: Degrees,

    /// Rotation per step.
    pub step_angle: Degrees,

    /// Direction of every step in this profile.
    pub direction: Direction,
}

impl MotionProfile {
    /// Plan a profile covering `angle` in `duration_s` seconds.
    ///
    /// `angle` must be non-zero and `duration_s` positive and within
    /// [`fits_timeline`](Self::fits_timeline); all are checked at the API
    /// boundary before planning.
    pub fn plan(start_us: u64, duration_s: f32, angle: Degrees, step_angle: Degrees) -> Self {
        let increment_s = step_angle.0 as f64 * duration_s as f64 / angle.abs().0 as f64;
        Self {
            start_us,
            duration_us: (duration_s as f64 * 1e6) as u64,
            increment_us: increment_s * 1e6,
            angle_at_start: angle,
            step_angle,
            direction: Direction::from_angle(angle),
        }
    }

    /// Whether `duration_s` is representable on the microsecond timeline.
    #[inline]
    pub fn fits_timeline(duration_s: f32) -> bool {
        duration_s as f64 * 1e6 <= MAX_DURATION_US as f64
    }

    /// Absolute deadline of step `k` (1-based).
    #[inline]
    pub fn deadline(&self, k: u32) -> u64 {
        self.start_us
            .saturating_add(libm::round(k as f64 * self.increment_us) as u64)
    }

    /// Whole steps needed to cover the planned angle.
    pub fn expected_steps(&self) -> u32 {
        libm::roundf(self.angle_at_start.abs().0 / self.step_angle.0) as u32
    }

    /// End of the time budget, with half a step of slack for rounding.
    #[inline]
    pub fn budget_end_us(&self) -> u64 {
        self.start_us
            .saturating_add(self.duration_us)
            .saturating_add((self.increment_us / 2.0) as u64)
    }
}
