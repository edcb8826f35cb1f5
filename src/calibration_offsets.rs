use core::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Identity of one physical sensor, the key its offsets are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Static biases of one sensor. `acc` is in g, `gyro` in rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOffsets {
    pub acc: Vector3<f64>,
    pub gyro: Vector3<f64>,
}

impl CalibrationOffsets {
    pub fn new(acc: Vector3<f64>, gyro: Vector3<f64>) -> Self {
        Self { acc, gyro }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct CalibrationOffsetsSerde {
    pub acc: [f64; 3],
    pub gyro: [f64; 3],
}

impl From<&CalibrationOffsets> for CalibrationOffsetsSerde {
    fn from(offsets: &CalibrationOffsets) -> Self {
        Self {
            acc: offsets.acc.into(),
            gyro: offsets.gyro.into(),
        }
    }
}

impl From<CalibrationOffsetsSerde> for CalibrationOffsets {
    fn from(value: CalibrationOffsetsSerde) -> Self {
        Self {
            acc: value.acc.into(),
            gyro: value.gyro.into(),
        }
    }
}
