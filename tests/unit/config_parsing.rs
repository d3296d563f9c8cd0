//! Unit tests for TOML configuration parsing.

use antenna_rotator::config::{load_config, parse_config, AxisKind, RotatorConfig};
use antenna_rotator::config::units::Microsteps;
use antenna_rotator::error::{ConfigError, Error};

const FULL_CONFIG: &str = r#"
[azimuth]
name = "Azimuth"
kind = "circular"
gear_ratio = 12.2222
microsteps = 4
full_step_angle_deg = 1.8
pulse_width_us = 10
max_speed_deg_per_sec = 5.0
debounce_ms = 500

[azimuth.pins]
enable = 0
dir = 1
step = 4
encoder_a = 8
encoder_b = 9
button = 10

[elevation]
name = "Elevation"
kind = "linear"
gear_ratio = 11.0
microsteps = 4
invert_direction = true

[magnetometer]
address = 0x1e
declination_deg = 3.5
azimuth_correction_deg = -176.0
x_offset = 114
y_offset = 128
samples = 100
"#;

/// Test parsing a complete rotator configuration.
#[test]
fn test_parse_full_config() {
    let config: RotatorConfig = toml::from_str(FULL_CONFIG).expect("Failed to parse TOML");

    let az = &config.azimuth;
    assert_eq!(az.name.as_str(), "Azimuth");
    assert_eq!(az.kind, AxisKind::Circular);
    assert_eq!(az.microsteps, Microsteps::QUARTER);
    assert_eq!(az.max_speed.unwrap().0, 5.0);
    let pins = az.pins.expect("pins present");
    assert_eq!((pins.enable, pins.dir, pins.step), (0, 1, 4));
    assert_eq!((pins.encoder_a, pins.encoder_b, pins.button), (8, 9, 10));

    let el = &config.elevation;
    assert_eq!(el.kind, AxisKind::Linear);
    assert!(el.invert_direction);
    assert!(el.max_speed.is_none());
    assert!(el.pins.is_none());
    // Defaults
    assert_eq!(el.pulse_width_us, 10);
    assert_eq!(el.debounce_ms, 500);
    assert_eq!(el.full_step_angle.0, 1.8);

    let mag = &config.magnetometer;
    assert_eq!(mag.address, 0x1e);
    assert_eq!(mag.declination.0, 3.5);
    assert_eq!(mag.azimuth_correction.0, -176.0);
    assert_eq!((mag.x_offset, mag.y_offset), (114, 128));
    assert_eq!(mag.samples, 100);
}

/// Test that the magnetometer section is optional and defaults to the reference chip setup.
#[test]
fn test_magnetometer_defaults() {
    let toml_str = r#"
[azimuth]
name = "az"
microsteps = 8
max_speed_deg_per_sec = 2.0

[elevation]
name = "el"
kind = "linear"
microsteps = 8
"#;

    let config = parse_config(toml_str).expect("Config should parse");
    assert_eq!(config.magnetometer.config_a, 0x70);
    assert_eq!(config.magnetometer.config_b, 0xa0);
    assert_eq!(config.magnetometer.mode, 0x00);
    assert_eq!(config.azimuth.gear_ratio, 1.0);
}

/// Test rejection of non power-of-two microsteps.
#[test]
fn test_invalid_microsteps() {
    let toml_str = FULL_CONFIG.replacen("microsteps = 4", "microsteps = 3", 1);
    let result: Result<RotatorConfig, _> = toml::from_str(&toml_str);
    assert!(result.is_err());

    assert!(matches!(
        parse_config(&toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test rejection of an unknown axis kind.
#[test]
fn test_invalid_axis_kind() {
    let toml_str = FULL_CONFIG.replace("kind = \"linear\"", "kind = \"telescopic\"");
    assert!(parse_config(&toml_str).is_err());
}

/// Test that a missing file reports an I/O error.
#[test]
fn test_load_missing_file() {
    assert!(matches!(
        load_config("/nonexistent/rotator.toml"),
        Err(Error::Config(ConfigError::IoError(_)))
    ));
}

/// Test loading from a file on disk.
#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join("antenna_rotator_config_parsing.toml");
    std::fs::write(&path, FULL_CONFIG).expect("write temp config");

    let config = load_config(&path).expect("Config should load");
    assert_eq!(config.elevation.name.as_str(), "Elevation");

    let _ = std::fs::remove_file(&path);
}
