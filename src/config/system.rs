//! System configuration - root configuration structure.

use serde::Deserialize;

use super::axis::AxisConfig;
use super::magnetometer::MagnetometerConfig;

/// Identifies one of the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    /// Sensor-driven circular axis.
    Azimuth,
    /// Directly driven linear axis.
    Elevation,
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RotatorConfig {
    /// Sensor-driven circular axis.
    pub azimuth: AxisConfig,

    /// Directly driven linear axis.
    pub elevation: AxisConfig,

    /// Compass used for azimuth feedback.
    #[serde(default)]
    pub magnetometer: MagnetometerConfig,
}

impl RotatorConfig {
    /// The reference two-axis mount.
    pub fn reference() -> Self {
        Self {
            azimuth: AxisConfig::azimuth_reference(),
            elevation: AxisConfig::elevation_reference(),
            magnetometer: MagnetometerConfig::default(),
        }
    }

    /// Get an axis configuration.
    pub fn axis(&self, id: AxisId) -> &AxisConfig {
        match id {
            AxisId::Azimuth => &self.azimuth,
            AxisId::Elevation => &self.elevation,
        }
    }
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self::reference()
    }
}
