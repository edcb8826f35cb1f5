//! Orientation tracking for 6-axis IMUs (MPU-6050 and compatibles).
//!
//! The pipeline is: a [`RawImu`] source is bias calibrated once by the
//! [`BiasCalibrator`], wrapped in a [`CalibratedImu`], and then driven by an
//! [`OrientationIntegrator`] which keeps a 4x4 homogeneous transform and a
//! running attitude sum up to date.
//!
//! Gyro integration is first order and nothing corrects accumulated drift
//! after the initial gravity alignment.

pub use calibrated_imu::CalibratedImu;
pub use calibration_offsets::{CalibrationOffsets, DeviceId};
pub use calibrator::{BiasCalibrator, CalibrationOutcome};
pub use config::{config_from_json, default_store_path, OrientationConfig};
pub use driver::clock::{Clock, SystemClock};
pub use driver::imu::{decode_i16, RawImu, RawSample, SensorError};
pub use driver::mpu6050::Mpu6050;
pub use error::{OrientationError, PersistenceError};
pub use offset_store::{JsonOffsetStore, MemoryOffsetStore, OffsetStore};
pub use orientation::{CycleReading, OrientationIntegrator, OrientationState};
pub use rotation::{rotation_matrix, rotation_matrix_by_name, RotationAxis};

mod calibrated_imu;
mod calibration_offsets;
mod calibrator;
pub mod config;
pub mod driver;
mod error;
mod offset_store;
mod orientation;
pub mod rotation;
#[cfg(test)]
mod tests;
