//! Unit tests for configuration validation.

use antenna_rotator::config::units::{Degrees, DegreesPerSec};
use antenna_rotator::config::{validate_config, AxisKind, RotatorConfig};
use antenna_rotator::error::{ConfigError, Error};

/// Test validation of the reference configuration.
#[test]
fn test_reference_config_passes_validation() {
    assert!(validate_config(&RotatorConfig::reference()).is_ok());
    assert!(validate_config(&RotatorConfig::default()).is_ok());
}

/// Test that the azimuth axis must wrap.
#[test]
fn test_linear_azimuth_rejected() {
    let mut config = RotatorConfig::reference();
    config.azimuth.kind = AxisKind::Linear;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::AzimuthNotCircular))
    ));
}

/// Test that azimuth needs a slew speed.
#[test]
fn test_azimuth_without_speed_rejected() {
    let mut config = RotatorConfig::reference();
    config.azimuth.max_speed = None;

    match validate_config(&config) {
        Err(Error::Config(ConfigError::MissingMaxSpeed(name))) => {
            assert_eq!(name.as_str(), "Azimuth");
        }
        other => panic!("expected MissingMaxSpeed, got {:?}", other),
    }
}

/// Test rejection of non-positive and NaN mechanical parameters.
#[test]
fn test_bad_mechanics_rejected() {
    let mut config = RotatorConfig::reference();
    config.elevation.gear_ratio = -11.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGearRatio(_)))
    ));

    let mut config = RotatorConfig::reference();
    config.azimuth.full_step_angle = Degrees(f32::NAN);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidFullStepAngle(_)))
    ));

    let mut config = RotatorConfig::reference();
    config.elevation.pulse_width_us = 0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidPulseWidth))
    ));

    let mut config = RotatorConfig::reference();
    config.azimuth.max_speed = Some(DegreesPerSec(0.0));
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxSpeed(_)))
    ));
}

/// Test that heading averaging needs at least one sample.
#[test]
fn test_zero_samples_rejected() {
    let mut config = RotatorConfig::reference();
    config.magnetometer.samples = 0;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSampleCount))
    ));
}
