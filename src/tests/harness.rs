use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    calibration_offsets::{CalibrationOffsets, DeviceId},
    driver::{
        clock::Clock,
        imu::{RawImu, RawSample, SensorError},
    },
    error::PersistenceError,
    offset_store::OffsetStore,
};

struct ScriptState {
    accel: RawSample,
    gyro: RawSample,
    accel_queue: VecDeque<RawSample>,
    accel_reads: usize,
    gyro_reads: usize,
    accel_fail_after: Option<usize>,
    gyro_fail_after: Option<usize>,
}

/// Sensor double. Clones share state so a test can keep a handle after the
/// sensor has been moved into a calibrator or integrator.
#[derive(Clone)]
pub struct ScriptedImu {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedImu {
    pub fn constant(accel: RawSample, gyro: RawSample) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                accel,
                gyro,
                accel_queue: VecDeque::new(),
                accel_reads: 0,
                gyro_reads: 0,
                accel_fail_after: None,
                gyro_fail_after: None,
            })),
        }
    }

    pub fn set_accel(&self, accel: RawSample) {
        self.state.lock().unwrap().accel = accel;
    }

    pub fn set_gyro(&self, gyro: RawSample) {
        self.state.lock().unwrap().gyro = gyro;
    }

    /// Served before falling back to the constant accel sample.
    pub fn queue_accel(&self, samples: impl IntoIterator<Item = RawSample>) {
        self.state.lock().unwrap().accel_queue.extend(samples);
    }

    /// Every accel read after `successful` more reads fails.
    pub fn fail_accel_after(&self, successful: usize) {
        let mut state = self.state.lock().unwrap();
        state.accel_fail_after = Some(state.accel_reads + successful);
    }

    pub fn fail_gyro_after(&self, successful: usize) {
        let mut state = self.state.lock().unwrap();
        state.gyro_fail_after = Some(state.gyro_reads + successful);
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.accel_fail_after = None;
        state.gyro_fail_after = None;
    }

    pub fn accel_reads(&self) -> usize {
        self.state.lock().unwrap().accel_reads
    }

    pub fn gyro_reads(&self) -> usize {
        self.state.lock().unwrap().gyro_reads
    }
}

impl RawImu for ScriptedImu {
    fn read_raw_accel(&mut self) -> Result<RawSample, SensorError> {
        let mut state = self.state.lock().unwrap();
        if state.accel_fail_after.is_some_and(|limit| state.accel_reads >= limit) {
            return Err(SensorError::Other("accel read failed".into()));
        }
        state.accel_reads += 1;
        let sample = state.accel_queue.pop_front().unwrap_or(state.accel);
        Ok(sample)
    }

    fn read_raw_gyro(&mut self) -> Result<RawSample, SensorError> {
        let mut state = self.state.lock().unwrap();
        if state.gyro_fail_after.is_some_and(|limit| state.gyro_reads >= limit) {
            return Err(SensorError::Other("gyro read failed".into()));
        }
        state.gyro_reads += 1;
        Ok(state.gyro)
    }
}

struct ClockState {
    now: f64,
    tick: f64,
}

/// Time only moves when slept, advanced, or by `tick` on every read.
#[derive(Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new(tick: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState { now: 0.0, tick })),
        }
    }

    pub fn set_tick(&self, tick: f64) {
        self.state.lock().unwrap().tick = tick;
    }

    pub fn advance(&self, seconds: f64) {
        self.state.lock().unwrap().now += seconds;
    }

    pub fn peek(&self) -> f64 {
        self.state.lock().unwrap().now
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        state.now += state.tick;
        now
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_secs_f64());
    }
}

/// Loads work, every save fails.
pub struct ReadOnlyStore;

impl OffsetStore for ReadOnlyStore {
    fn load_offsets(&self, _id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError> {
        Ok(None)
    }

    fn save_offsets(
        &self,
        _id: DeviceId,
        _offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }
}
