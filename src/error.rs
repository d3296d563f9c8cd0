//! Error types for antenna-rotator.
//!
//! Provides unified error handling across configuration, hardware access,
//! motion requests and heading calibration.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all antenna-rotator operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Pin or bus operation failed
    Hardware(HardwareError),
    /// Malformed motion request
    Motion(MotionError),
    /// Sensor values imply miscalibration
    Calibration(CalibrationError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Invalid gear ratio (must be > 0)
    InvalidGearRatio(f32),
    /// Invalid full step angle (must be > 0)
    InvalidFullStepAngle(f32),
    /// Pulse width must be at least one microsecond
    InvalidPulseWidth,
    /// Invalid max slew speed (must be > 0)
    InvalidMaxSpeed(f32),
    /// Azimuth axis has no max slew speed
    MissingMaxSpeed(heapless::String<32>),
    /// Azimuth axis must be configured as circular
    AzimuthNotCircular,
    /// Heading sample count must be > 0
    InvalidSampleCount,
    /// A builder was missing a required component
    MissingComponent(&'static str),
    /// Arbiter debounce window differs from the axis configuration
    DebounceMismatch {
        /// Window in the axis configuration
        configured_ms: u32,
        /// Window the arbiter was created with
        arbiter_ms: u32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Control line identifiers used in hardware errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLine {
    /// Driver ENABLE output
    Enable,
    /// Driver DIR output
    Direction,
    /// Driver STEP output
    Step,
    /// Encoder phase A input
    EncoderA,
    /// Encoder phase B input
    EncoderB,
    /// Encoder push button input
    Button,
}

/// Hardware I/O errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// Digital pin read or write failed
    Pin(PinLine),
    /// I2C transfer with the magnetometer failed
    Bus {
        /// Register being accessed
        register: u8,
    },
}

/// Motion request errors, rejected before any line is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Duration must be strictly positive
    NonPositiveDuration(f32),
    /// Duration or angle is NaN or infinite
    NonFiniteRequest,
    /// Duration does not fit the microsecond timeline
    DurationOutOfRange(f32),
    /// The axis is currently owned by the manual override
    ManualOverrideActive,
    /// A jog step was requested outside a manual override
    JogNotActive,
}

/// Heading calibration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Heading computation produced NaN or infinity
    NonFiniteHeading,
    /// Averaging requested over zero samples
    NoSamples,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Hardware(e) => write!(f, "Hardware I/O error: {}", e),
            Error::Motion(e) => write!(f, "Invalid motion: {}", e),
            Error::Calibration(e) => write!(f, "Calibration error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidGearRatio(v) => write!(f, "Invalid gear ratio: {}. Must be > 0", v),
            ConfigError::InvalidFullStepAngle(v) => {
                write!(f, "Invalid full step angle: {}. Must be > 0", v)
            }
            ConfigError::InvalidPulseWidth => write!(f, "Pulse width must be at least 1 us"),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::MissingMaxSpeed(name) => {
                write!(f, "Axis '{}' requires max_speed_deg_per_sec", name)
            }
            ConfigError::AzimuthNotCircular => write!(f, "Azimuth axis must be circular"),
            ConfigError::InvalidSampleCount => write!(f, "Heading sample count must be > 0"),
            ConfigError::MissingComponent(what) => write!(f, "{} is required", what),
            ConfigError::DebounceMismatch {
                configured_ms,
                arbiter_ms,
            } => write!(
                f,
                "Arbiter debounce {} ms does not match configured {} ms",
                arbiter_ms, configured_ms
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PinLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PinLine::Enable => "ENABLE",
            PinLine::Direction => "DIR",
            PinLine::Step => "STEP",
            PinLine::EncoderA => "encoder A",
            PinLine::EncoderB => "encoder B",
            PinLine::Button => "encoder button",
        };
        f.write_str(name)
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::Pin(line) => write!(f, "{} pin operation failed", line),
            HardwareError::Bus { register } => {
                write!(f, "I2C transfer failed at register {:#04x}", register)
            }
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::NonPositiveDuration(d) => {
                write!(f, "Duration {} s must be > 0", d)
            }
            MotionError::NonFiniteRequest => write!(f, "Duration and angle must be finite"),
            MotionError::DurationOutOfRange(d) => write!(f, "Duration {} s is too long", d),
            MotionError::ManualOverrideActive => {
                write!(f, "Axis is under manual override")
            }
            MotionError::JogNotActive => write!(f, "Axis is not in manual jog mode"),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::NonFiniteHeading => write!(f, "Heading is not a finite number"),
            CalibrationError::NoSamples => write!(f, "No heading samples requested"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Error::Hardware(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Error::Calibration(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for HardwareError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for CalibrationError {}
