use crate::driver::imu::SensorError;

#[derive(Debug, thiserror::Error)]
pub enum OrientationError {
    #[error("Sensor read failed: {0}")]
    SensorRead(#[from] SensorError),

    #[error("Calibration degenerate: {0}")]
    CalibrationDegenerate(&'static str),

    #[error("Invalid rotation axis: {0:?}")]
    InvalidAxis(String),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Division by zero: {0}")]
    DivideByZero(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed offset store: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Offset store lock poisoned")]
    Poisoned,
}
