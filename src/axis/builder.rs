//! Builder pattern for AxisEngine.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{validate_axis, AxisConfig, AxisId, RotatorConfig};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{AxisPins, Clock};

use super::arbiter::AxisArbiter;
use super::engine::AxisEngine;

/// Builder for creating AxisEngine instances.
pub struct AxisEngineBuilder<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    enable_pin: Option<EN>,
    dir_pin: Option<DIR>,
    step_pin: Option<STEP>,
    delay: Option<DELAY>,
    clock: Option<CLK>,
    config: Option<AxisConfig>,
    arbiter: Option<&'a AxisArbiter>,
}

impl<'a, EN, DIR, STEP, DELAY, CLK> Default for AxisEngineBuilder<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, EN, DIR, STEP, DELAY, CLK> AxisEngineBuilder<'a, EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            enable_pin: None,
            dir_pin: None,
            step_pin: None,
            delay: None,
            clock: None,
            config: None,
            arbiter: None,
        }
    }

    /// Set the ENABLE pin.
    pub fn enable_pin(mut self, pin: EN) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the monotonic clock.
    pub fn clock(mut self, clock: CLK) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the drive parameters.
    pub fn config(mut self, config: AxisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure from a RotatorConfig by axis.
    pub fn from_config(self, config: &RotatorConfig, axis: AxisId) -> Self {
        self.config(config.axis(axis).clone())
    }

    /// Set the ownership token shared with the button edge handler.
    ///
    /// Its debounce window must match the axis configuration.
    pub fn arbiter(mut self, arbiter: &'a AxisArbiter) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    /// Build the AxisEngine.
    ///
    /// Parks the lines: driver disabled, DIR forward, STEP high.
    ///
    /// # Errors
    ///
    /// Returns an error if a component is missing, the axis configuration is
    /// invalid, the arbiter debounces differently from the configuration, or
    /// a line cannot be parked.
    pub fn build(self) -> Result<AxisEngine<'a, EN, DIR, STEP, DELAY, CLK>> {
        let enable = self
            .enable_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("enable_pin")))?;
        let dir = self
            .dir_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("dir_pin")))?;
        let step = self
            .step_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("step_pin")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingComponent("delay")))?;
        let clock = self
            .clock
            .ok_or(Error::Config(ConfigError::MissingComponent("clock")))?;
        let arbiter = self
            .arbiter
            .ok_or(Error::Config(ConfigError::MissingComponent("arbiter")))?;
        let config = self
            .config
            .ok_or(Error::Config(ConfigError::MissingComponent("config")))?;

        validate_axis(&config)?;
        if arbiter.debounce_ms() != config.debounce_ms {
            return Err(ConfigError::DebounceMismatch {
                configured_ms: config.debounce_ms,
                arbiter_ms: arbiter.debounce_ms(),
            }
            .into());
        }

        AxisEngine::new(AxisPins { enable, dir, step }, delay, clock, config, arbiter)
    }
}
