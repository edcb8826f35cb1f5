use nalgebra::Vector3;

use crate::{
    calibration_offsets::CalibrationOffsets,
    config::OrientationConfig,
    driver::imu::{RawImu, RawSample, SensorError},
};

#[inline(always)]
pub(crate) fn acc_from_raw(raw: &RawSample, acc_sensitivity: f64) -> Vector3<f64> {
    raw.scaled(acc_sensitivity)
}

#[inline(always)]
pub(crate) fn ang_v_from_raw(raw: &RawSample, gyro_sensitivity: f64) -> Vector3<f64> {
    raw.scaled(gyro_sensitivity).map(f64::to_radians)
}

/// A raw sensor with its biases removed.
pub struct CalibratedImu<S> {
    sensor: S,
    offsets: CalibrationOffsets,
    acc_sensitivity: f64,
    gyro_sensitivity: f64,
}

impl<S: RawImu> CalibratedImu<S> {
    pub fn new(sensor: S, offsets: CalibrationOffsets, config: &OrientationConfig) -> Self {
        Self {
            sensor,
            offsets,
            acc_sensitivity: config.acc_sensitivity,
            gyro_sensitivity: config.gyro_sensitivity,
        }
    }

    pub fn offsets(&self) -> &CalibrationOffsets {
        &self.offsets
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn into_inner(self) -> S {
        self.sensor
    }

    /// Acceleration in g with the accelerometer bias removed.
    pub fn get_acc(&mut self) -> Result<Vector3<f64>, SensorError> {
        let raw = self.sensor.read_raw_accel()?;
        Ok(acc_from_raw(&raw, self.acc_sensitivity) - self.offsets.acc)
    }

    /// Angular velocity in rad/s with the gyro bias removed.
    pub fn get_ang_v(&mut self) -> Result<Vector3<f64>, SensorError> {
        let raw = self.sensor.read_raw_gyro()?;
        Ok(ang_v_from_raw(&raw, self.gyro_sensitivity) - self.offsets.gyro)
    }
}
