//! Manual override - encoder-driven jogging of one axis.
//!
//! A debounced button edge hands the axis to the override (see
//! [`AxisArbiter::on_button_edge`](crate::axis::AxisArbiter::on_button_edge)).
//! The jog loop then follows encoder detents, one STEP pulse per detent,
//! until the button is pressed again.
//!
//! The encoder button rests high through its pull-up; pressing pulls it low.
//! A jog therefore runs while the button reads released and ends on the next
//! press. The release of that press is the edge the arbiter reports as
//! [`EdgeAction::ExitConfirmed`](crate::axis::EdgeAction::ExitConfirmed).

use heapless::String;

use crate::axis::StepperAxis;
use crate::config::units::Degrees;
use crate::error::{Error, Result};
use crate::hal::EncoderInputs;
use crate::motion::Direction;

/// Jog state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JogState {
    /// Not jogging.
    #[default]
    Idle,
    /// Following the encoder.
    Jogging,
}

/// Operator-visible summary of a finished jog.
#[derive(Debug, Clone, PartialEq)]
pub struct JogReport {
    /// Axis name.
    pub axis: String<32>,
    /// Net signed rotation applied during the jog.
    pub accumulated: Degrees,
}

/// Result of one jog poll.
#[derive(Debug, Clone, PartialEq)]
pub enum JogPoll {
    /// No jog in progress.
    Idle,
    /// Still jogging.
    Continue,
    /// Button pressed; the axis was disabled and handed back.
    Finished(JogReport),
}

/// Encoder jog state machine for one axis.
///
/// Holds no hardware; the axis and encoder are lent on each call.
#[derive(Debug, Default)]
pub struct ManualOverride {
    state: JogState,
    accumulated: Degrees,
    prev_a: bool,
}

impl ManualOverride {
    /// Create an idle override.
    pub const fn new() -> Self {
        Self {
            state: JogState::Idle,
            accumulated: Degrees(0.0),
            prev_a: false,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> JogState {
        self.state
    }

    /// Net rotation since the jog started.
    #[inline]
    pub fn accumulated(&self) -> Degrees {
        self.accumulated
    }

    /// Idle → Jogging: take the axis, enable it and zero the counter.
    ///
    /// Any motion profile in flight is discarded.
    pub fn enter<A, E>(&mut self, axis: &mut A, encoder: &mut E) -> Result<()>
    where
        A: StepperAxis,
        E: EncoderInputs,
    {
        axis.begin_manual()?;
        self.accumulated = Degrees(0.0);
        self.prev_a = match encoder.phases() {
            Ok((a, _)) => a,
            Err(e) => return Err(self.abort(axis, e)),
        };
        self.state = JogState::Jogging;
        info!("{} setting", axis.config().name.as_str());
        Ok(())
    }

    /// Sample the encoder once.
    ///
    /// A falling edge on phase A is one detent: equal A/B levels step
    /// forward, unequal step reverse.
    pub fn poll<A, E>(&mut self, axis: &mut A, encoder: &mut E) -> Result<JogPoll>
    where
        A: StepperAxis,
        E: EncoderInputs,
    {
        if self.state == JogState::Idle {
            return Ok(JogPoll::Idle);
        }

        let released = match encoder.button_released() {
            Ok(released) => released,
            Err(e) => return Err(self.abort(axis, e)),
        };
        if !released {
            return self.exit(axis).map(JogPoll::Finished);
        }

        let (a, b) = match encoder.phases() {
            Ok(levels) => levels,
            Err(e) => return Err(self.abort(axis, e)),
        };

        if self.prev_a && !a {
            let direction = if a == b {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            if let Err(e) = axis.jog_step(direction) {
                self.reset();
                return Err(e);
            }
            self.accumulated = Degrees(self.accumulated.0 + direction.sign() * axis.step_angle().0);
        }
        self.prev_a = a;

        Ok(JogPoll::Continue)
    }

    /// Enter if needed, then poll until the button ends the jog.
    ///
    /// Blocks the calling context for the whole jog.
    pub fn run<A, E>(&mut self, axis: &mut A, encoder: &mut E) -> Result<JogReport>
    where
        A: StepperAxis,
        E: EncoderInputs,
    {
        if self.state == JogState::Idle {
            self.enter(axis, encoder)?;
        }
        loop {
            if let JogPoll::Finished(report) = self.poll(axis, encoder)? {
                return Ok(report);
            }
        }
    }

    /// Jogging → Idle: disable the axis, log and return the net change.
    pub fn exit<A: StepperAxis>(&mut self, axis: &mut A) -> Result<JogReport> {
        let accumulated = self.accumulated;
        self.reset();
        axis.end_manual()?;

        let name = &axis.config().name;
        info!(
            "{} change: {}",
            name.as_str(),
            libm::roundf(accumulated.0 * 100.0) / 100.0
        );
        Ok(JogReport {
            axis: name.clone(),
            accumulated,
        })
    }

    fn reset(&mut self) {
        self.state = JogState::Idle;
        self.accumulated = Degrees(0.0);
    }

    /// Drop out of the jog after an encoder fault, leaving the axis disabled.
    fn abort<A: StepperAxis>(&mut self, axis: &mut A, err: Error) -> Error {
        self.reset();
        let _ = axis.end_manual();
        warn!("{} jog aborted on encoder fault", axis.config().name.as_str());
        err
    }
}
