use embedded_hal::i2c::ErrorKind;
use nalgebra::Vector3;

/// One raw 16-bit triple straight from the sensor registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Scales the counts by `sensitivity` (LSB per physical unit).
    pub fn scaled(&self, sensitivity: f64) -> Vector3<f64> {
        Vector3::new(self.x as f64, self.y as f64, self.z as f64) / sensitivity
    }
}

impl From<(i16, i16, i16)> for RawSample {
    fn from((x, y, z): (i16, i16, i16)) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    #[error("bus error reading register {register:#04x}: {kind:?}")]
    Bus { register: u8, kind: ErrorKind },

    #[error("{0}")]
    Other(String),
}

/// Source of raw accelerometer and gyroscope counts. Reads block until the
/// bus transaction completes.
pub trait RawImu {
    fn read_raw_accel(&mut self) -> Result<RawSample, SensorError>;
    fn read_raw_gyro(&mut self) -> Result<RawSample, SensorError>;
}

impl<T: RawImu + ?Sized> RawImu for &mut T {
    fn read_raw_accel(&mut self) -> Result<RawSample, SensorError> {
        (**self).read_raw_accel()
    }

    fn read_raw_gyro(&mut self) -> Result<RawSample, SensorError> {
        (**self).read_raw_gyro()
    }
}

/// Joins a high/low register pair into a two's complement value.
#[inline(always)]
pub fn decode_i16(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}
