use std::{path::PathBuf, time::Duration};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::OrientationError;

/// LSB per g at the ±2g accelerometer range.
pub const ACC_SENSITIVITY: f64 = 16384.0;
/// LSB per deg/s at the ±250 deg/s gyro range.
pub const GYRO_SENSITIVITY: f64 = 131.0;
/// Hz
pub const SAMPLING_FREQUENCY: f64 = 10.0;
pub const CALIBRATION_WINDOW_S: f64 = 1.0;
pub const INIT_SAMPLE_COUNT: usize = 10;
/// Local gravity the sensitivities were characterised against, m/s^2.
pub const LOCAL_GRAVITY: f64 = 9.79414;

const STORE_FILE_NAME: &str = "offsets.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrientationConfig {
    pub acc_sensitivity: f64,
    pub gyro_sensitivity: f64,
    pub sampling_frequency: f64,
    pub calibration_window_s: f64,
    pub init_sample_count: usize,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            acc_sensitivity: ACC_SENSITIVITY,
            gyro_sensitivity: GYRO_SENSITIVITY,
            sampling_frequency: SAMPLING_FREQUENCY,
            calibration_window_s: CALIBRATION_WINDOW_S,
            init_sample_count: INIT_SAMPLE_COUNT,
        }
    }
}

impl OrientationConfig {
    /// Time between two control cycles, `1 / sampling_frequency`.
    pub fn sampling_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sampling_frequency)
    }

    pub fn validate(&self) -> Result<(), OrientationError> {
        if !is_positive(self.acc_sensitivity) {
            return Err(OrientationError::InvalidConfig(
                "acc_sensitivity must be positive",
            ));
        }
        if !is_positive(self.gyro_sensitivity) {
            return Err(OrientationError::InvalidConfig(
                "gyro_sensitivity must be positive",
            ));
        }
        if !is_positive(self.sampling_frequency) {
            return Err(OrientationError::InvalidConfig(
                "sampling_frequency must be positive",
            ));
        }
        // a zero window is allowed here, calibration reports it as a zero sample count
        if !(self.calibration_window_s >= 0.0 && self.calibration_window_s.is_finite()) {
            return Err(OrientationError::InvalidConfig(
                "calibration_window_s must be finite and not negative",
            ));
        }
        if self.init_sample_count == 0 {
            return Err(OrientationError::InvalidConfig(
                "init_sample_count must be at least 1",
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn config_from_json(json: &str) -> Result<OrientationConfig, OrientationError> {
    let config: OrientationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// `<platform data dir>/mpu-orientation/offsets.json`
pub fn default_store_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "mpu-orientation")?;
    Some(dirs.data_dir().join(STORE_FILE_NAME))
}
