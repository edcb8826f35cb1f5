use nalgebra::Vector3;

use crate::{
    calibrated_imu::{acc_from_raw, ang_v_from_raw, CalibratedImu},
    calibration_offsets::{CalibrationOffsets, DeviceId},
    config::OrientationConfig,
    driver::{clock::Clock, imu::RawImu},
    error::{OrientationError, PersistenceError},
    offset_store::OffsetStore,
};

#[derive(Debug)]
pub enum CalibrationOutcome {
    /// Offsets were found in the store, the sensor was not sampled.
    AlreadyCalibrated(CalibrationOffsets),
    /// Offsets were measured this session. `persist_error` is set when they
    /// could not be written back; the offsets are still valid for this session.
    Calibrated {
        offsets: CalibrationOffsets,
        sample_count: usize,
        persist_error: Option<PersistenceError>,
    },
}

impl CalibrationOutcome {
    pub fn offsets(&self) -> CalibrationOffsets {
        match self {
            CalibrationOutcome::AlreadyCalibrated(offsets) => *offsets,
            CalibrationOutcome::Calibrated { offsets, .. } => *offsets,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CalibrationOutcome::Calibrated { .. })
    }

    pub fn persist_error(&self) -> Option<&PersistenceError> {
        match self {
            CalibrationOutcome::Calibrated { persist_error, .. } => persist_error.as_ref(),
            CalibrationOutcome::AlreadyCalibrated(_) => None,
        }
    }
}

/// Measures static accel and gyro biases by averaging everything the sensor
/// produces during a fixed wall clock window. The sensor must be at rest with
/// its Z axis vertical.
pub struct BiasCalibrator<St, C> {
    store: St,
    clock: C,
    config: OrientationConfig,
}

impl<St: OffsetStore, C: Clock> BiasCalibrator<St, C> {
    pub fn new(store: St, clock: C, config: OrientationConfig) -> Result<Self, OrientationError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn calibrate<S: RawImu>(
        &self,
        sensor: &mut S,
        id: DeviceId,
    ) -> Result<CalibrationOutcome, OrientationError> {
        if let Some(offsets) = self.store.load_offsets(id)? {
            log::info!("MPU {} has already been calibrated", id);
            return Ok(CalibrationOutcome::AlreadyCalibrated(offsets));
        }

        log::info!("MPU {} calibrating...", id);
        let (offsets, sample_count) = self.measure(sensor)?;

        let persist_error = match self.store.save_offsets(id, &offsets) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("MPU {} offsets could not be saved: {}", id, e);
                Some(e)
            }
        };
        log::info!("MPU {} calibrated from {} samples", id, sample_count);

        Ok(CalibrationOutcome::Calibrated {
            offsets,
            sample_count,
            persist_error,
        })
    }

    /// Calibrates `sensor` and wraps it so its readings come out bias free.
    pub fn calibrate_imu<S: RawImu>(
        &self,
        mut sensor: S,
        id: DeviceId,
    ) -> Result<(CalibratedImu<S>, CalibrationOutcome), OrientationError> {
        let outcome = self.calibrate(&mut sensor, id)?;
        let imu = CalibratedImu::new(sensor, outcome.offsets(), &self.config);
        Ok((imu, outcome))
    }

    fn measure<S: RawImu>(
        &self,
        sensor: &mut S,
    ) -> Result<(CalibrationOffsets, usize), OrientationError> {
        let mut total_acc = Vector3::<f64>::zeros();
        let mut total_gyro = Vector3::<f64>::zeros();
        let mut count = 0usize;

        let start = self.clock.now_s();
        while self.clock.now_s() - start < self.config.calibration_window_s {
            let acc = sensor.read_raw_accel()?;
            let gyro = sensor.read_raw_gyro()?;
            total_acc += acc_from_raw(&acc, self.config.acc_sensitivity);
            total_gyro += ang_v_from_raw(&gyro, self.config.gyro_sensitivity);
            count += 1;
        }

        if count == 0 {
            return Err(OrientationError::DivideByZero(
                "no samples taken during the calibration window",
            ));
        }
        log::trace!("calibration window closed after {} samples", count);

        let mut acc = total_acc / count as f64;
        // at rest Z reads +1g, keep gravity out of the bias
        acc.z -= 1.0;
        let gyro = total_gyro / count as f64;

        Ok((CalibrationOffsets::new(acc, gyro), count))
    }
}
