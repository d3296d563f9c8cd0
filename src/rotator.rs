//! Two-axis rotator controller.
//!
//! Combines the azimuth axis with compass feedback for absolute pointing,
//! and drives elevation by relative moves only.
//!
//! [`Rotator::split`] hands out one channel per axis. Each channel borrows
//! only its own axis (and, for azimuth, the sensor), so the two can be driven
//! from separate threads or tasks: a jog on one axis never stalls the step
//! timing of the other.

use embedded_hal::i2c::I2c;

use crate::axis::{StepperAxis, TickOutcome};
use crate::config::units::{Degrees, DegreesPerSec};
use crate::config::{AxisId, RotatorConfig};
use crate::error::{ConfigError, MotionError, Result};
use crate::hal::EncoderInputs;
use crate::jog::{JogPoll, JogReport, JogState, ManualOverride};
use crate::sensor::HeadingSensor;

/// Azimuth/elevation mount controller.
///
/// Generic over the two axes (normally [`AxisEngine`](crate::AxisEngine))
/// and the magnetometer bus.
pub struct Rotator<AZ, EL, I2C> {
    azimuth: AZ,
    elevation: EL,
    sensor: HeadingSensor<I2C>,
    max_speed: DegreesPerSec,
    samples: u16,
}

impl<AZ, EL, I2C> Rotator<AZ, EL, I2C>
where
    AZ: StepperAxis,
    EL: StepperAxis,
    I2C: I2c,
{
    /// Assemble a controller from built parts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingMaxSpeed` if the azimuth axis has no slew
    /// speed, or `ConfigError::InvalidSampleCount` if the sensor averages
    /// zero samples.
    pub fn new(azimuth: AZ, elevation: EL, sensor: HeadingSensor<I2C>) -> Result<Self> {
        let max_speed = azimuth
            .config()
            .max_speed
            .ok_or_else(|| ConfigError::MissingMaxSpeed(azimuth.config().name.clone()))?;
        let samples = sensor.config().samples;
        if samples == 0 {
            return Err(ConfigError::InvalidSampleCount.into());
        }

        Ok(Self {
            azimuth,
            elevation,
            sensor,
            max_speed,
            samples,
        })
    }

    /// Build the sensor from `config`, write its registers and assemble.
    pub fn from_config(config: &RotatorConfig, azimuth: AZ, elevation: EL, i2c: I2C) -> Result<Self> {
        let mut sensor = HeadingSensor::new(i2c, config.magnetometer.clone());
        sensor.configure()?;
        Self::new(azimuth, elevation, sensor)
    }

    /// Borrow the two axes as independent channels.
    pub fn split(&mut self) -> (AzimuthChannel<'_, AZ, I2C>, ElevationChannel<'_, EL>) {
        (
            AzimuthChannel {
                axis: &mut self.azimuth,
                sensor: &mut self.sensor,
                max_speed: self.max_speed,
                samples: self.samples,
            },
            ElevationChannel {
                axis: &mut self.elevation,
            },
        )
    }

    /// Averaged compass heading.
    pub fn heading(&mut self) -> Result<Degrees> {
        self.split().0.heading()
    }

    /// Turn the azimuth axis to an absolute compass bearing.
    ///
    /// See [`AzimuthChannel::turn_to`].
    pub fn turn_to_azimuth(&mut self, target: Degrees) -> Result<()> {
        self.split().0.turn_to(target)
    }

    /// Move elevation by `angle` over `duration_s`, blocking for the duration.
    pub fn move_elevation(&mut self, duration_s: f32, angle: Degrees) -> Result<()> {
        self.split().1.move_by(duration_s, angle)
    }

    /// Advance both axes by at most one step each without blocking.
    pub fn poll(&mut self) -> Result<(TickOutcome, TickOutcome)> {
        let az = self.azimuth.tick()?;
        let el = self.elevation.tick()?;
        Ok((az, el))
    }

    /// Run a pending manual jog on `axis` to completion.
    ///
    /// Returns `None` when no button edge has handed the axis over.
    pub fn service_manual<E: EncoderInputs>(
        &mut self,
        axis: AxisId,
        jog: &mut ManualOverride,
        encoder: &mut E,
    ) -> Result<Option<JogReport>> {
        match axis {
            AxisId::Azimuth => run_pending(&mut self.azimuth, jog, encoder),
            AxisId::Elevation => run_pending(&mut self.elevation, jog, encoder),
        }
    }

    /// Get the azimuth axis.
    #[inline]
    pub fn azimuth(&self) -> &AZ {
        &self.azimuth
    }

    /// Get the azimuth axis mutably.
    #[inline]
    pub fn azimuth_mut(&mut self) -> &mut AZ {
        &mut self.azimuth
    }

    /// Get the elevation axis.
    #[inline]
    pub fn elevation(&self) -> &EL {
        &self.elevation
    }

    /// Get the elevation axis mutably.
    #[inline]
    pub fn elevation_mut(&mut self) -> &mut EL {
        &mut self.elevation
    }

    /// Get the heading sensor.
    #[inline]
    pub fn sensor(&mut self) -> &mut HeadingSensor<I2C> {
        &mut self.sensor
    }

    /// Tear down and hand back the parts.
    pub fn release(self) -> (AZ, EL, HeadingSensor<I2C>) {
        (self.azimuth, self.elevation, self.sensor)
    }
}

/// Azimuth axis and compass, borrowed from a [`Rotator`].
pub struct AzimuthChannel<'r, AZ, I2C> {
    axis: &'r mut AZ,
    sensor: &'r mut HeadingSensor<I2C>,
    max_speed: DegreesPerSec,
    samples: u16,
}

impl<'r, AZ, I2C> AzimuthChannel<'r, AZ, I2C>
where
    AZ: StepperAxis,
    I2C: I2c,
{
    /// Averaged compass heading.
    pub fn heading(&mut self) -> Result<Degrees> {
        self.sensor.read_heading(self.samples)
    }

    /// Plan a turn to `target` without waiting for it.
    ///
    /// Reads the heading and plans the raw difference at the configured slew
    /// speed; the engine picks the short way round. Returns the instant the
    /// turn's duration ends, or `None` if the axis is already there. Drive it
    /// with [`tick`](Self::tick), which leaves room to
    /// [`poll_manual`](Self::poll_manual) in between.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::NonFiniteRequest` for a NaN or infinite target,
    /// before the sensor is read.
    pub fn begin_turn(&mut self, target: Degrees) -> Result<Option<u64>> {
        if !target.0.is_finite() {
            return Err(MotionError::NonFiniteRequest.into());
        }

        let current = self.heading()?;
        let delta = target - current;
        let duration = self.max_speed.time_for(delta);
        if duration <= 0.0 {
            return Ok(None);
        }

        debug!("azimuth {} -> {}", current.0, target.0);
        begin(&mut *self.axis, duration, delta).map(Some)
    }

    /// Turn to an absolute compass bearing, blocking for the planned duration.
    ///
    /// Returns only once the duration has elapsed, even if a manual override
    /// takes the axis part way through. A zero difference returns at once.
    pub fn turn_to(&mut self, target: Degrees) -> Result<()> {
        if let Some(end_us) = self.begin_turn(target)? {
            finish(&mut *self.axis, end_us)?;
        }
        Ok(())
    }

    /// Advance the azimuth profile by at most one step.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.axis.tick()
    }

    /// Service the manual override without blocking. See [`poll_manual`].
    pub fn poll_manual<E: EncoderInputs>(
        &mut self,
        jog: &mut ManualOverride,
        encoder: &mut E,
    ) -> Result<JogPoll> {
        poll_manual(&mut *self.axis, jog, encoder)
    }

    /// Run a pending jog to completion; `None` when none is requested.
    pub fn service_manual<E: EncoderInputs>(
        &mut self,
        jog: &mut ManualOverride,
        encoder: &mut E,
    ) -> Result<Option<JogReport>> {
        run_pending(&mut *self.axis, jog, encoder)
    }

    /// Get the azimuth axis.
    #[inline]
    pub fn axis(&mut self) -> &mut AZ {
        &mut *self.axis
    }
}

/// Elevation axis, borrowed from a [`Rotator`].
pub struct ElevationChannel<'r, EL> {
    axis: &'r mut EL,
}

impl<'r, EL: StepperAxis> ElevationChannel<'r, EL> {
    /// Plan a relative move without waiting for it; returns its end instant.
    pub fn begin_move(&mut self, duration_s: f32, angle: Degrees) -> Result<u64> {
        begin(&mut *self.axis, duration_s, angle)
    }

    /// Move by `angle` over `duration_s`, blocking for the duration.
    pub fn move_by(&mut self, duration_s: f32, angle: Degrees) -> Result<()> {
        let end_us = self.begin_move(duration_s, angle)?;
        finish(&mut *self.axis, end_us)
    }

    /// Advance the elevation profile by at most one step.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.axis.tick()
    }

    /// Service the manual override without blocking. See [`poll_manual`].
    pub fn poll_manual<E: EncoderInputs>(
        &mut self,
        jog: &mut ManualOverride,
        encoder: &mut E,
    ) -> Result<JogPoll> {
        poll_manual(&mut *self.axis, jog, encoder)
    }

    /// Run a pending jog to completion; `None` when none is requested.
    pub fn service_manual<E: EncoderInputs>(
        &mut self,
        jog: &mut ManualOverride,
        encoder: &mut E,
    ) -> Result<Option<JogReport>> {
        run_pending(&mut *self.axis, jog, encoder)
    }

    /// Get the elevation axis.
    #[inline]
    pub fn axis(&mut self) -> &mut EL {
        &mut *self.axis
    }
}

/// One non-blocking round of the manual override on `axis`.
///
/// Enters the jog when a button edge has handed the axis over, then samples
/// the encoder once. Returns [`JogPoll::Idle`] when there is nothing to do.
pub fn poll_manual<A, E>(axis: &mut A, jog: &mut ManualOverride, encoder: &mut E) -> Result<JogPoll>
where
    A: StepperAxis,
    E: EncoderInputs,
{
    if jog.state() == JogState::Idle {
        if !axis.manual_requested() {
            return Ok(JogPoll::Idle);
        }
        jog.enter(axis, encoder)?;
    }
    jog.poll(axis, encoder)
}

/// Start a move and return the instant its duration ends.
fn begin<A: StepperAxis>(axis: &mut A, duration_s: f32, angle: Degrees) -> Result<u64> {
    let start = axis.now_us();
    axis.move_for(duration_s, angle)?;
    Ok(start.saturating_add((duration_s as f64 * 1e6) as u64))
}

/// Step out the profile in flight and hold the caller until `end_us`.
fn finish<A: StepperAxis>(axis: &mut A, end_us: u64) -> Result<()> {
    if axis.run_to_completion()? == TickOutcome::Preempted {
        debug!("{} handed to manual override", axis.config().name.as_str());
    }
    axis.wait_until(end_us);
    Ok(())
}

fn run_pending<A, E>(axis: &mut A, jog: &mut ManualOverride, encoder: &mut E) -> Result<Option<JogReport>>
where
    A: StepperAxis,
    E: EncoderInputs,
{
    if !axis.manual_requested() {
        return Ok(None);
    }
    jog.run(axis, encoder).map(Some)
}
