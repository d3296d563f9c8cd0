//! Magnetometer (HMC5883L-style) configuration.

use serde::Deserialize;

use super::units::Degrees;

/// Register map of the compass chip.
pub mod reg {
    /// Configuration register A (averaging, output rate).
    pub const CONFIG_A: u8 = 0x00;
    /// Configuration register B (gain).
    pub const CONFIG_B: u8 = 0x01;
    /// Mode register.
    pub const MODE: u8 = 0x02;
    /// X axis output, MSB first.
    pub const DATA_X: u8 = 0x03;
    /// Z axis output, MSB first.
    pub const DATA_Z: u8 = 0x05;
    /// Y axis output, MSB first.
    pub const DATA_Y: u8 = 0x07;
}

/// Magnetometer bus address, register setup and heading calibration.
#[derive(Debug, Clone, Deserialize)]
pub struct MagnetometerConfig {
    /// 7-bit I2C address.
    #[serde(default = "default_address")]
    pub address: u8,

    /// Value written to configuration register A.
    #[serde(default = "default_config_a")]
    pub config_a: u8,

    /// Value written to configuration register B (gain).
    #[serde(default = "default_config_b")]
    pub config_b: u8,

    /// Value written to the mode register (0 = continuous).
    #[serde(default)]
    pub mode: u8,

    /// Local magnetic declination.
    #[serde(default = "default_declination", rename = "declination_deg")]
    pub declination: Degrees,

    /// Sensor mounting correction added to every heading.
    #[serde(default = "default_azimuth_correction", rename = "azimuth_correction_deg")]
    pub azimuth_correction: Degrees,

    /// Hard-iron offset added to raw X.
    #[serde(default = "default_x_offset")]
    pub x_offset: i32,

    /// Hard-iron offset added to raw Y.
    #[serde(default = "default_y_offset")]
    pub y_offset: i32,

    /// Headings averaged per reading.
    #[serde(default = "default_samples")]
    pub samples: u16,
}

fn default_address() -> u8 {
    0x1e
}

fn default_config_a() -> u8 {
    0x70
}

fn default_config_b() -> u8 {
    0xa0
}

fn default_declination() -> Degrees {
    Degrees(3.5)
}

fn default_azimuth_correction() -> Degrees {
    Degrees(-176.0)
}

fn default_x_offset() -> i32 {
    114
}

fn default_y_offset() -> i32 {
    128
}

fn default_samples() -> u16 {
    100
}

impl Default for MagnetometerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            config_a: default_config_a(),
            config_b: default_config_b(),
            mode: 0,
            declination: default_declination(),
            azimuth_correction: default_azimuth_correction(),
            x_offset: default_x_offset(),
            y_offset: default_y_offset(),
            samples: default_samples(),
        }
    }
}
