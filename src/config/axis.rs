//! Per-axis drive configuration.

use heapless::String;
use serde::Deserialize;

use super::units::{Degrees, DegreesPerSec, Microsteps};

/// Geometry of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Full-turn axis; remaining travel is kept as the shortest signed arc.
    #[default]
    Circular,
    /// Range-limited axis with no wrap (mechanical stops are external).
    Linear,
}

/// Pin numbers for one axis.
///
/// Deployment data only: the core never interprets these, it is handed
/// ready-made `embedded-hal` pins. Board setup code uses this table to build
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PinAssignment {
    /// Driver ENABLE output.
    pub enable: u8,
    /// Driver DIR output.
    pub dir: u8,
    /// Driver STEP output (step on falling edge).
    pub step: u8,
    /// Encoder phase A input (pull-up).
    pub encoder_a: u8,
    /// Encoder phase B input (pull-up).
    pub encoder_b: u8,
    /// Encoder push button input (pull-up).
    pub button: u8,
}

/// Complete axis configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name used in log output (max 32 chars).
    pub name: String<32>,

    /// Circular (azimuth) or linear (elevation).
    #[serde(default)]
    pub kind: AxisKind,

    /// Gear ratio (output:input, e.g. 11.0 means 11:1 reduction).
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio: f32,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    pub microsteps: Microsteps,

    /// Motor full-step angle in degrees (1.8 for 200-step motors).
    #[serde(default = "default_full_step_angle", rename = "full_step_angle_deg")]
    pub full_step_angle: Degrees,

    /// STEP low time in microseconds.
    #[serde(default = "default_pulse_width_us")]
    pub pulse_width_us: u32,

    /// Maximum slew speed; required for sensor-driven axes.
    #[serde(default, rename = "max_speed_deg_per_sec")]
    pub max_speed: Option<DegreesPerSec>,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Manual override button debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,

    /// Optional pin map for board setup code.
    #[serde(default)]
    pub pins: Option<PinAssignment>,
}

fn default_gear_ratio() -> f32 {
    1.0
}

fn default_full_step_angle() -> Degrees {
    Degrees(1.8)
}

fn default_pulse_width_us() -> u32 {
    10
}

fn default_debounce_ms() -> u32 {
    500
}

impl AxisConfig {
    /// Output rotation produced by one STEP pulse.
    ///
    /// `full_step_angle / (microsteps * gear_ratio)`
    pub fn step_angle(&self) -> Degrees {
        Degrees(self.full_step_angle.0 / (self.microsteps.value() as f32 * self.gear_ratio))
    }

    /// Whether remaining travel wraps around a full turn.
    #[inline]
    pub fn is_circular(&self) -> bool {
        self.kind == AxisKind::Circular
    }

    /// Reference azimuth drive: 110/9 spur gears, quarter stepping, 5 deg/s.
    pub fn azimuth_reference() -> Self {
        Self {
            name: String::try_from("Azimuth").unwrap_or_default(),
            kind: AxisKind::Circular,
            gear_ratio: 110.0 / 9.0,
            microsteps: Microsteps::QUARTER,
            full_step_angle: default_full_step_angle(),
            pulse_width_us: default_pulse_width_us(),
            max_speed: Some(DegreesPerSec(5.0)),
            invert_direction: false,
            debounce_ms: default_debounce_ms(),
            pins: Some(PinAssignment {
                enable: 0,
                dir: 1,
                step: 4,
                encoder_a: 8,
                encoder_b: 9,
                button: 10,
            }),
        }
    }

    /// Reference elevation drive: 11:1 spur gears, quarter stepping.
    pub fn elevation_reference() -> Self {
        Self {
            name: String::try_from("Elevation").unwrap_or_default(),
            kind: AxisKind::Linear,
            gear_ratio: 11.0,
            microsteps: Microsteps::QUARTER,
            full_step_angle: default_full_step_angle(),
            pulse_width_us: default_pulse_width_us(),
            max_speed: None,
            invert_direction: false,
            debounce_ms: default_debounce_ms(),
            pins: Some(PinAssignment {
                enable: 5,
                dir: 6,
                step: 7,
                encoder_a: 11,
                encoder_b: 12,
                button: 13,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_angle() {
        let config = AxisConfig::azimuth_reference();
        // 1.8 / (4 * 110/9) = 0.0368...
        assert!((config.step_angle().0 - 0.036_818).abs() < 1e-5);

        let config = AxisConfig::elevation_reference();
        // 1.8 / (4 * 11) = 0.0409...
        assert!((config.step_angle().0 - 0.040_909).abs() < 1e-5);
    }

    #[test]
    fn test_reference_kinds() {
        assert!(AxisConfig::azimuth_reference().is_circular());
        assert!(!AxisConfig::elevation_reference().is_circular());
        assert_eq!(AxisConfig::azimuth_reference().name.as_str(), "Azimuth");
    }
}
