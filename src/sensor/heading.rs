//! Compass heading from a three-axis magnetometer over I2C.

use embedded_hal::i2c::I2c;

use crate::config::units::Degrees;
use crate::config::{reg, MagnetometerConfig};
use crate::error::{CalibrationError, HardwareError, Result};

/// One raw field sample with hard-iron offsets applied to X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingSample {
    /// Corrected X component.
    pub x: i32,
    /// Corrected Y component.
    pub y: i32,
    /// Raw Z component (unused for heading).
    pub z: i16,
}

/// Magnetometer driver producing averaged, calibrated headings.
pub struct HeadingSensor<I2C> {
    i2c: I2C,
    config: MagnetometerConfig,
}

impl<I2C: I2c> HeadingSensor<I2C> {
    /// Wrap a bus. Call [`configure`](Self::configure) before sampling.
    pub fn new(i2c: I2C, config: MagnetometerConfig) -> Self {
        Self { i2c, config }
    }

    /// Calibration and register setup in use.
    #[inline]
    pub fn config(&self) -> &MagnetometerConfig {
        &self.config
    }

    /// Write configuration registers A and B and the mode register.
    pub fn configure(&mut self) -> Result<()> {
        let writes = [
            (reg::CONFIG_A, self.config.config_a),
            (reg::CONFIG_B, self.config.config_b),
            (reg::MODE, self.config.mode),
        ];
        for (register, value) in writes {
            self.i2c
                .write(self.config.address, &[register, value])
                .map_err(|_| HardwareError::Bus { register })?;
        }
        debug!("magnetometer configured at {}", self.config.address);
        Ok(())
    }

    /// Read a single register byte.
    pub fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.config.address, &[register], &mut buf)
            .map_err(|_| HardwareError::Bus { register })?;
        Ok(buf[0])
    }

    /// Read a big-endian two's-complement 16-bit value starting at `register`.
    pub fn read_raw_axis(&mut self, register: u8) -> Result<i16> {
        let low_register = register
            .checked_add(1)
            .ok_or(HardwareError::Bus { register })?;
        let high = self.read_register(register)?;
        let low = self.read_register(low_register)?;
        Ok(i16::from_be_bytes([high, low]))
    }

    /// Read X, Z and Y (register order) and apply the X/Y offsets.
    pub fn read_sample(&mut self) -> Result<HeadingSample> {
        let x = self.read_raw_axis(reg::DATA_X)?;
        let z = self.read_raw_axis(reg::DATA_Z)?;
        let y = self.read_raw_axis(reg::DATA_Y)?;
        Ok(HeadingSample {
            x: x as i32 + self.config.x_offset,
            y: y as i32 + self.config.y_offset,
            z,
        })
    }

    /// Heading of one sample in `[0, 360)`.
    pub fn heading_of(&self, sample: &HeadingSample) -> Result<Degrees> {
        heading_from(sample, &self.config)
    }

    /// Mean of `samples` independently computed headings.
    ///
    /// The mean is arithmetic, so samples straddling north average toward
    /// south. No retries: the first bus failure is returned.
    pub fn read_heading(&mut self, samples: u16) -> Result<Degrees> {
        if samples == 0 {
            return Err(CalibrationError::NoSamples.into());
        }

        let mut sum = 0.0f32;
        for _ in 0..samples {
            let sample = self.read_sample()?;
            sum += heading_from(&sample, &self.config)?.0;
        }

        Ok(Degrees(sum / samples as f32))
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn heading_from(sample: &HeadingSample, config: &MagnetometerConfig) -> Result<Degrees> {
    let raw = Degrees::from_radians(libm::atan2f(sample.y as f32, sample.x as f32));
    let heading = (raw + config.declination + config.azimuth_correction).wrap_heading_once();
    if !heading.0.is_finite() {
        return Err(CalibrationError::NonFiniteHeading.into());
    }
    Ok(heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use proptest::prelude::*;
    use std::vec::Vec;

    const ADDR: u8 = 0x1e;

    /// Calibration with no offsets or corrections.
    fn plain_config() -> MagnetometerConfig {
        MagnetometerConfig {
            declination: Degrees(0.0),
            azimuth_correction: Degrees(0.0),
            x_offset: 0,
            y_offset: 0,
            ..MagnetometerConfig::default()
        }
    }

    fn axis_reads(register: u8, value: i16) -> [I2cTransaction; 2] {
        let [high, low] = value.to_be_bytes();
        [
            I2cTransaction::write_read(ADDR, vec![register], vec![high]),
            I2cTransaction::write_read(ADDR, vec![register + 1], vec![low]),
        ]
    }

    fn sample_reads(x: i16, z: i16, y: i16) -> Vec<I2cTransaction> {
        let mut t = Vec::new();
        t.extend(axis_reads(reg::DATA_X, x));
        t.extend(axis_reads(reg::DATA_Z, z));
        t.extend(axis_reads(reg::DATA_Y, y));
        t
    }

    #[test]
    fn test_configure_writes_registers() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x00, 0x70]),
            I2cTransaction::write(ADDR, vec![0x01, 0xa0]),
            I2cTransaction::write(ADDR, vec![0x02, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut sensor = HeadingSensor::new(i2c.clone(), MagnetometerConfig::default());
        sensor.configure().unwrap();

        i2c.done();
    }

    #[test]
    fn test_raw_axis_is_twos_complement() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0xff]),
            I2cTransaction::write_read(ADDR, vec![0x04], vec![0xfe]),
            I2cTransaction::write_read(ADDR, vec![0x05], vec![0x01]),
            I2cTransaction::write_read(ADDR, vec![0x06], vec![0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut sensor = HeadingSensor::new(i2c.clone(), plain_config());
        assert_eq!(sensor.read_raw_axis(reg::DATA_X).unwrap(), -2);
        assert_eq!(sensor.read_raw_axis(reg::DATA_Z).unwrap(), 256);

        i2c.done();
    }

    #[test]
    fn test_heading_wraps_below_zero() {
        // Raw atan2 of (0, 1) is 0; correction pushes it to -10
        let config = MagnetometerConfig {
            azimuth_correction: Degrees(-10.0),
            ..plain_config()
        };
        let mut i2c = I2cMock::new(&sample_reads(1, 0, 0));

        let mut sensor = HeadingSensor::new(i2c.clone(), config);
        let heading = sensor.read_heading(1).unwrap();
        assert!((heading.0 - 350.0).abs() < 1e-3);

        i2c.done();
    }

    #[test]
    fn test_heading_wraps_above_360() {
        // Raw atan2 of (1, 0) is 90; +280 gives 370
        let config = MagnetometerConfig {
            azimuth_correction: Degrees(280.0),
            ..plain_config()
        };
        let mut i2c = I2cMock::new(&sample_reads(0, 0, 1));

        let mut sensor = HeadingSensor::new(i2c.clone(), config);
        let heading = sensor.read_heading(1).unwrap();
        assert!((heading.0 - 10.0).abs() < 1e-3);

        i2c.done();
    }

    #[test]
    fn test_offsets_applied_and_headings_averaged() {
        // Raw X = -114 becomes 0 after the reference offset, Y = 100 + 128 = 228:
        // straight along +Y, 90 deg before corrections
        let config = MagnetometerConfig {
            declination: Degrees(0.0),
            azimuth_correction: Degrees(0.0),
            ..MagnetometerConfig::default()
        };
        let mut reads = sample_reads(-114, 7, 100);
        // Second sample along +X: 0 deg
        reads.extend(sample_reads(-14, 7, -128));
        let mut i2c = I2cMock::new(&reads);

        let mut sensor = HeadingSensor::new(i2c.clone(), config);
        let heading = sensor.read_heading(2).unwrap();
        assert!((heading.0 - 45.0).abs() < 1e-3);

        i2c.done();
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut i2c = I2cMock::new(&[]);
        let mut sensor = HeadingSensor::new(i2c.clone(), plain_config());

        assert_eq!(
            sensor.read_heading(0),
            Err(Error::Calibration(CalibrationError::NoSamples))
        );

        i2c.done();
    }

    #[test]
    fn test_bus_error_names_register() {
        use embedded_hal::i2c::ErrorKind;

        let expectations = [I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00])
            .with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);

        let mut sensor = HeadingSensor::new(i2c.clone(), plain_config());
        assert_eq!(
            sensor.read_heading(1),
            Err(Error::Hardware(HardwareError::Bus { register: 0x03 }))
        );

        i2c.done();
    }

    #[test]
    fn test_non_finite_calibration_rejected() {
        let config = MagnetometerConfig {
            declination: Degrees(f32::NAN),
            ..plain_config()
        };
        let sensor = HeadingSensor::new(I2cMock::new(&[]), config);
        let sample = HeadingSample { x: 1, y: 0, z: 0 };

        assert_eq!(
            sensor.heading_of(&sample),
            Err(Error::Calibration(CalibrationError::NonFiniteHeading))
        );

        sensor.release().done();
    }

    #[test]
    fn test_axis_read_at_last_register_rejected() {
        let mut i2c = I2cMock::new(&[]);
        let mut sensor = HeadingSensor::new(i2c.clone(), plain_config());

        assert_eq!(
            sensor.read_raw_axis(0xff),
            Err(Error::Hardware(HardwareError::Bus { register: 0xff }))
        );

        i2c.done();
    }

    proptest! {
        #[test]
        fn repeated_reads_of_a_steady_field_agree(
            x in -2048i16..2048,
            y in -2048i16..2048,
            samples in 1u16..4,
        ) {
            let mut reads = Vec::new();
            for _ in 0..2 * samples {
                reads.extend(sample_reads(x, 0, y));
            }
            let mut i2c = I2cMock::new(&reads);
            let mut sensor = HeadingSensor::new(i2c.clone(), MagnetometerConfig::default());

            let first = sensor.read_heading(samples).unwrap();
            let second = sensor.read_heading(samples).unwrap();
            prop_assert_eq!(first, second);

            i2c.done();
        }
    }
}
