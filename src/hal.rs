//! Hardware seams not covered by `embedded-hal`.
//!
//! Digital lines, delays and the I2C bus come straight from `embedded-hal`
//! 1.0. This module adds the monotonic clock the step scheduler keys its
//! deadlines on, and groups the per-axis pins.

use embedded_hal::digital::InputPin;

use crate::error::{HardwareError, PinLine, Result};

/// Monotonic microsecond timeline.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin. Never decreases.
    fn now_us(&mut self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_us(&mut self) -> u64 {
        (**self).now_us()
    }
}

/// [`Clock`] backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a timeline at the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&mut self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Driver outputs of one axis.
#[derive(Debug)]
pub struct AxisPins<EN, DIR, STEP> {
    /// ENABLE line (high = driver enabled).
    pub enable: EN,
    /// DIR line (high = forward unless inverted).
    pub dir: DIR,
    /// STEP line (idle high, step on falling edge).
    pub step: STEP,
}

/// Operator inputs of one axis: a quadrature encoder with push button.
pub trait EncoderInputs {
    /// `true` while the button rests at its pulled-up idle level.
    fn button_released(&mut self) -> Result<bool>;

    /// Current levels of phases A and B (`true` = high).
    fn phases(&mut self) -> Result<(bool, bool)>;
}

/// [`EncoderInputs`] over three `embedded-hal` input pins.
#[derive(Debug)]
pub struct EncoderPins<A, B, SW> {
    /// Phase A.
    pub a: A,
    /// Phase B.
    pub b: B,
    /// Push button.
    pub button: SW,
}

impl<A, B, SW> EncoderInputs for EncoderPins<A, B, SW>
where
    A: InputPin,
    B: InputPin,
    SW: InputPin,
{
    fn button_released(&mut self) -> Result<bool> {
        Ok(self
            .button
            .is_high()
            .map_err(|_| HardwareError::Pin(PinLine::Button))?)
    }

    fn phases(&mut self) -> Result<(bool, bool)> {
        let a = self
            .a
            .is_high()
            .map_err(|_| HardwareError::Pin(PinLine::EncoderA))?;
        let b = self
            .b
            .is_high()
            .map_err(|_| HardwareError::Pin(PinLine::EncoderB))?;
        Ok((a, b))
    }
}
