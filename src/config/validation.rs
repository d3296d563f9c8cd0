//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, AxisKind, MagnetometerConfig, RotatorConfig};

/// Validate a rotator configuration.
///
/// Checks:
/// - Gear ratio, full step angle and pulse width are positive
/// - Max speed, when present, is positive
/// - Azimuth is circular and has a max speed (slew time is derived from it)
/// - Heading sample count is non-zero
pub fn validate_config(config: &RotatorConfig) -> Result<()> {
    validate_axis(&config.azimuth)?;
    validate_axis(&config.elevation)?;

    if config.azimuth.kind != AxisKind::Circular {
        return Err(Error::Config(ConfigError::AzimuthNotCircular));
    }

    if config.azimuth.max_speed.is_none() {
        return Err(Error::Config(ConfigError::MissingMaxSpeed(
            config.azimuth.name.clone(),
        )));
    }

    validate_magnetometer(&config.magnetometer)
}

pub(crate) fn validate_axis(config: &AxisConfig) -> Result<()> {
    // NaN fails every comparison, so test for the valid range
    if !(config.gear_ratio > 0.0) {
        return Err(Error::Config(ConfigError::InvalidGearRatio(config.gear_ratio)));
    }

    if !(config.full_step_angle.0 > 0.0) {
        return Err(Error::Config(ConfigError::InvalidFullStepAngle(
            config.full_step_angle.0,
        )));
    }

    if config.pulse_width_us == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseWidth));
    }

    if let Some(speed) = config.max_speed {
        if !(speed.0 > 0.0) {
            return Err(Error::Config(ConfigError::InvalidMaxSpeed(speed.0)));
        }
    }

    Ok(())
}

fn validate_magnetometer(config: &MagnetometerConfig) -> Result<()> {
    if config.samples == 0 {
        return Err(Error::Config(ConfigError::InvalidSampleCount));
    }
    Ok(())
}
