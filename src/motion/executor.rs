//! Motion execution - step scheduling against a monotonic clock.

use super::profile::MotionProfile;

/// What the scheduler should do at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing due before this instant.
    Wait {
        /// Absolute deadline of the next step.
        until_us: u64,
    },
    /// A step is due now.
    Step,
}

/// Runtime state during motion execution.
#[derive(Debug, Clone)]
pub struct MotionExecutor {
    /// The computed profile being executed.
    profile: MotionProfile,

    /// Steps emitted so far.
    steps_taken: u32,

    /// Deadline of the next step.
    next_deadline_us: u64,
}

impl MotionExecutor {
    /// Create a new executor for a motion profile.
    pub fn new(profile: MotionProfile) -> Self {
        let next_deadline_us = profile.deadline(1);
        Self {
            profile,
            steps_taken: 0,
            next_deadline_us,
        }
    }

    /// Decide whether a step is due at `now_us`.
    ///
    /// Late ticks still yield a single step; the following deadline stays on
    /// the absolute grid so the schedule catches up.
    #[inline]
    pub fn poll(&self, now_us: u64) -> Tick {
        if now_us < self.next_deadline_us {
            Tick::Wait {
                until_us: self.next_deadline_us,
            }
        } else {
            Tick::Step
        }
    }

    /// Record an emitted step and move the deadline forward by one increment.
    pub fn record_step(&mut self) {
        self.steps_taken += 1;
        self.next_deadline_us = self.profile.deadline(self.steps_taken + 1);
    }

    /// Whether the next deadline falls outside the time budget.
    #[inline]
    pub fn budget_exhausted(&self) -> bool {
        self.next_deadline_us > self.profile.budget_end_us()
    }

    /// Get the number of steps emitted.
    #[inline]
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Get the deadline of the next step.
    #[inline]
    pub fn next_deadline_us(&self) -> u64 {
        self.next_deadline_us
    }

    /// Get the motion profile.
    #[inline]
    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Get progress as a fraction (0.0 to 1.0).
    pub fn progress(&self) -> f32 {
        let expected = self.profile.expected_steps();
        if expected == 0 {
            1.0
        } else {
            (self.steps_taken as f32 / expected as f32).min(1.0)
        }
    }
}
