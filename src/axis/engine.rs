//! Axis engine - timed open-loop stepping of one axis.
//!
//! Generic over embedded-hal 1.0 pin and delay types and the crate [`Clock`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Degrees;
use crate::config::AxisConfig;
use crate::error::{Error, HardwareError, MotionError, PinLine, Result};
use crate::hal::{AxisPins, Clock};
use crate::motion::{Direction, MotionExecutor, MotionProfile, Tick};

use super::arbiter::{AxisArbiter, LineOwner};
use super::builder::AxisEngineBuilder;
use super::state::{AxisMode, AxisState};
use super::{StepperAxis, TickOutcome};

/// Stepper axis driver.
///
/// Generic over:
/// - `EN`, `DIR`, `STEP`: driver output pins (must implement `OutputPin`)
/// - `DELAY`: Delay provider for pulse width and waits (must implement `DelayNs`)
/// - `CLK`: Monotonic clock the step deadlines are keyed on
///
/// Every write to the driver lines goes through `&mut self`, and the step
/// scheduler only pulses while `arbiter` says it owns the lines.
pub struct AxisEngine<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// ENABLE/DIR/STEP outputs.
    pins: AxisPins<EN, DIR, STEP>,

    /// Delay provider for pulse timing.
    delay: DELAY,

    /// Monotonic time source.
    clock: CLK,

    /// Immutable drive parameters.
    config: AxisConfig,

    /// Cached `config.step_angle()`.
    step_angle: Degrees,

    /// Remaining angle, direction, enable and mode.
    state: AxisState,

    /// Step scheduler for the profile in flight (if any).
    executor: Option<MotionExecutor>,

    /// Line ownership token shared with the button edge handler.
    arbiter: &'a AxisArbiter,
}

impl<'a, EN, DIR, STEP, DELAY, CLK> AxisEngine<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// Create an idle engine and park the lines: driver disabled, DIR
    /// forward, STEP at its idle high level.
    pub(crate) fn new(
        pins: AxisPins<EN, DIR, STEP>,
        delay: DELAY,
        clock: CLK,
        config: AxisConfig,
        arbiter: &'a AxisArbiter,
    ) -> Result<Self> {
        let step_angle = config.step_angle();
        let mut engine = Self {
            pins,
            delay,
            clock,
            config,
            step_angle,
            state: AxisState::default(),
            executor: None,
            arbiter,
        };

        engine.write_enable(false)?;
        engine.write_direction(Direction::Forward)?;
        engine
            .pins
            .step
            .set_high()
            .map_err(|_| HardwareError::Pin(PinLine::Step))?;

        Ok(engine)
    }

    /// Create a builder for configuring an engine.
    pub fn builder() -> AxisEngineBuilder<'a, EN, DIR, STEP, DELAY, CLK> {
        AxisEngineBuilder::new()
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name.as_str()
    }

    /// Get the ownership token.
    #[inline]
    pub fn arbiter(&self) -> &'a AxisArbiter {
        self.arbiter
    }

    /// Get the step scheduler of the profile in flight.
    #[inline]
    pub fn executor(&self) -> Option<&MotionExecutor> {
        self.executor.as_ref()
    }

    /// Emit one step: STEP low, hold for the pulse width, back high.
    ///
    /// The only place the STEP line is driven; `&mut self` keeps pulses on
    /// one axis from overlapping.
    pub fn pulse(&mut self) -> Result<()> {
        self.pins
            .step
            .set_low()
            .map_err(|_| HardwareError::Pin(PinLine::Step))?;
        self.delay.delay_us(self.config.pulse_width_us);
        self.pins
            .step
            .set_high()
            .map_err(|_| HardwareError::Pin(PinLine::Step))?;
        Ok(())
    }

    /// Tear down the engine and hand back its resources.
    pub fn release(self) -> (AxisPins<EN, DIR, STEP>, DELAY, CLK) {
        (self.pins, self.delay, self.clock)
    }

    fn write_enable(&mut self, enabled: bool) -> Result<()> {
        let res = if enabled {
            self.pins.enable.set_high()
        } else {
            self.pins.enable.set_low()
        };
        res.map_err(|_| HardwareError::Pin(PinLine::Enable))?;
        self.state.enabled = enabled;
        Ok(())
    }

    fn write_direction(&mut self, direction: Direction) -> Result<()> {
        let pin_high = match direction {
            Direction::Forward => !self.config.invert_direction,
            Direction::Reverse => self.config.invert_direction,
        };

        let res = if pin_high {
            self.pins.dir.set_high()
        } else {
            self.pins.dir.set_low()
        };
        res.map_err(|_| HardwareError::Pin(PinLine::Direction))?;
        self.state.direction = direction;
        Ok(())
    }

    /// Force the axis safe after a line failure and pass the error through.
    fn fail_safe(&mut self, err: Error) -> Error {
        let owner = self.state.mode.line_owner();
        self.executor = None;
        self.state.remaining = Degrees(0.0);
        self.state.mode = AxisMode::Idle;
        self.state.enabled = false;
        let _ = self.pins.enable.set_low();
        if owner != LineOwner::Free {
            self.arbiter.release(owner);
        }
        warn!("{} disabled after hardware fault", self.config.name.as_str());
        err
    }

    /// Finish the profile in flight and disable the driver.
    fn complete(&mut self) -> Result<u32> {
        let steps = self.executor.take().map(|e| e.steps_taken()).unwrap_or(0);
        if self.state.remaining.abs().0 < self.step_angle.0 / 2.0 {
            self.state.remaining = Degrees(0.0);
        }
        if let Err(e) = self.write_enable(false) {
            return Err(self.fail_safe(e));
        }
        self.state.mode = AxisMode::Idle;
        self.arbiter.release(LineOwner::Auto);
        debug!("{} profile complete after {} steps", self.config.name.as_str(), steps);
        Ok(steps)
    }

    /// Drop a profile whose lines were claimed by the manual override.
    ///
    /// The lines now belong to the jog loop, so nothing is written here. The
    /// untravelled angle is dropped with the profile.
    fn preempt(&mut self) {
        if let Some(executor) = self.executor.take() {
            self.state.remaining = Degrees(0.0);
            warn!(
                "{} motion preempted by manual override after {} steps ({}%)",
                self.config.name.as_str(),
                executor.steps_taken(),
                libm::roundf(executor.progress() * 100.0)
            );
        }
        if self.state.is_moving() {
            self.state.mode = AxisMode::Idle;
        }
    }
}

/// One step toward zero, never crossing it.
fn step_toward_zero(remaining: Degrees, step: Degrees) -> Degrees {
    if remaining.abs().0 <= step.0 {
        Degrees(0.0)
    } else {
        Degrees(remaining.0 - Direction::from_angle(remaining).sign() * step.0)
    }
}

impl<'a, EN, DIR, STEP, DELAY, CLK> StepperAxis for AxisEngine<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    fn config(&self) -> &AxisConfig {
        &self.config
    }

    fn state(&self) -> &AxisState {
        &self.state
    }

    fn step_angle(&self) -> Degrees {
        self.step_angle
    }

    fn move_for(&mut self, duration_s: f32, angle: Degrees) -> Result<()> {
        if !duration_s.is_finite() || !angle.0.is_finite() {
            return Err(MotionError::NonFiniteRequest.into());
        }
        if duration_s <= 0.0 {
            return Err(MotionError::NonPositiveDuration(duration_s).into());
        }
        if !MotionProfile::fits_timeline(duration_s) {
            return Err(MotionError::DurationOutOfRange(duration_s).into());
        }
        if self.state.mode == AxisMode::ManualJog || self.arbiter.manual_requested() {
            return Err(MotionError::ManualOverrideActive.into());
        }

        let mut remaining = self.state.remaining + angle;
        if self.config.is_circular() {
            remaining = remaining.wrap_signed();
        }

        // Less than half a step rounds to no motion
        if remaining.abs().0 < self.step_angle.0 / 2.0 {
            self.state.remaining = remaining;
            if self.executor.is_some() {
                self.complete()?;
            }
            return Ok(());
        }

        if !self.arbiter.try_claim_auto() {
            return Err(MotionError::ManualOverrideActive.into());
        }

        self.state.remaining = remaining;
        self.state.mode = AxisMode::AutoMoving;
        let direction = Direction::from_angle(remaining);
        if let Err(e) = self
            .write_enable(true)
            .and_then(|_| self.write_direction(direction))
        {
            return Err(self.fail_safe(e));
        }

        let now = self.clock.now_us();
        let profile = MotionProfile::plan(now, duration_s, remaining, self.step_angle);
        info!(
            "{} moving {} deg over {} s ({} steps)",
            self.config.name.as_str(),
            remaining.0,
            duration_s,
            profile.expected_steps()
        );
        self.executor = Some(MotionExecutor::new(profile));
        Ok(())
    }

    fn tick(&mut self) -> Result<TickOutcome> {
        if self.executor.is_none() {
            return Ok(TickOutcome::Idle);
        }
        if !self.arbiter.is_held_by(LineOwner::Auto) {
            self.preempt();
            return Ok(TickOutcome::Preempted);
        }

        let now = self.clock.now_us();
        let due = match self.executor.as_ref() {
            Some(executor) => executor.poll(now),
            None => return Ok(TickOutcome::Idle),
        };
        if let Tick::Wait { until_us } = due {
            return Ok(TickOutcome::Waiting { until_us });
        }

        self.state.remaining = step_toward_zero(self.state.remaining, self.step_angle);
        if let Err(e) = self.pulse() {
            return Err(self.fail_safe(e));
        }

        let budget_exhausted = match self.executor.as_mut() {
            Some(executor) => {
                executor.record_step();
                executor.budget_exhausted()
            }
            None => return Ok(TickOutcome::Idle),
        };

        if budget_exhausted || self.state.remaining.abs().0 < self.step_angle.0 / 2.0 {
            let steps = self.complete()?;
            return Ok(TickOutcome::Completed { steps });
        }
        Ok(TickOutcome::Stepped)
    }

    fn now_us(&mut self) -> u64 {
        self.clock.now_us()
    }

    fn wait_until(&mut self, deadline_us: u64) {
        // A single delay call covers at most u32::MAX us
        loop {
            let now = self.clock.now_us();
            if now >= deadline_us {
                return;
            }
            let chunk = (deadline_us - now).min(u32::MAX as u64) as u32;
            self.delay.delay_us(chunk);
        }
    }

    fn manual_requested(&self) -> bool {
        self.arbiter.manual_requested()
    }

    fn begin_manual(&mut self) -> Result<()> {
        self.arbiter.claim_manual();
        debug!(
            "{} {} -> {}",
            self.config.name.as_str(),
            self.state.mode.name(),
            AxisMode::ManualJog.name()
        );
        self.preempt();
        self.state.mode = AxisMode::ManualJog;
        if let Err(e) = self.write_enable(true) {
            return Err(self.fail_safe(e));
        }
        Ok(())
    }

    fn jog_step(&mut self, direction: Direction) -> Result<()> {
        if self.state.mode != AxisMode::ManualJog {
            return Err(MotionError::JogNotActive.into());
        }
        if let Err(e) = self.write_direction(direction) {
            return Err(self.fail_safe(e));
        }
        // DIR setup time before the STEP edge
        self.delay.delay_us(self.config.pulse_width_us);
        if let Err(e) = self.pulse() {
            return Err(self.fail_safe(e));
        }
        Ok(())
    }

    fn end_manual(&mut self) -> Result<()> {
        if self.state.mode != AxisMode::ManualJog {
            return Err(MotionError::JogNotActive.into());
        }
        if let Err(e) = self.write_enable(false) {
            return Err(self.fail_safe(e));
        }
        self.state.mode = AxisMode::Idle;
        self.arbiter.release(LineOwner::Manual);
        Ok(())
    }
}
