use core::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use crate::{
    calibrated_imu::CalibratedImu,
    config::OrientationConfig,
    driver::{clock::Clock, imu::RawImu},
    error::OrientationError,
    rotation::{rotation_matrix, RotationAxis},
};

/// Homogeneous world up, `(0, 0, 1, 1)`.
fn world_up() -> Vector4<f64> {
    Vector4::new(0.0, 0.0, 1.0, 1.0)
}

/// Everything one integrator knows about its sensor's pose.
///
/// `transformation` maps body coordinates to world coordinates. Only its
/// rotation block is ever written; the translation column stays zero.
/// `attitude` is the plain running sum of every incremental rotation vector
/// and is not re-derived from `transformation`, so the two drift apart once
/// rotations about several axes are mixed. Neither is renormalised.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationState {
    pub transformation: Matrix4<f64>,
    pub attitude: Vector3<f64>,
    /// Clock time of the last completed init or update, seconds.
    pub moment: f64,
    /// Gravity compensated acceleration from the last update, in g.
    pub linear_acc: Vector3<f64>,
}

impl OrientationState {
    pub fn new(moment: f64) -> Self {
        Self {
            transformation: Matrix4::identity(),
            attitude: Vector3::zeros(),
            moment,
            linear_acc: Vector3::zeros(),
        }
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.transformation.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// `transformation * (0, 0, 1, 1)`
    pub fn gravity_in_body(&self) -> Vector4<f64> {
        self.transformation * world_up()
    }
}

/// What one update cycle measured and derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReading {
    pub dt: f64,
    pub acc: Vector3<f64>,
    pub ang_v: Vector3<f64>,
    pub linear_acc: Vector3<f64>,
}

/// Gravity aligned starting transform for a mean acceleration `g`.
///
/// Tilts about X by `acos(gz/|g|) - π`, then turns about Z by
/// `atan(gy/gx) + π/2`.
pub(crate) fn initial_transformation(g: &Vector3<f64>) -> Result<Matrix4<f64>, OrientationError> {
    let norm = g.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(OrientationError::CalibrationDegenerate(
            "mean gravity vector has zero length",
        ));
    }

    // rounding can push the ratio just past ±1
    let tilt = (g.z / norm).clamp(-1.0, 1.0).acos() - PI;
    let azimuth = if g.x == 0.0 && g.y == 0.0 {
        0.0
    } else {
        (g.y / g.x).atan()
    };

    let rx = rotation_matrix(RotationAxis::X, &Vector3::new(tilt, 0.0, 0.0)).to_homogeneous();
    let rz = rotation_matrix(RotationAxis::Z, &Vector3::new(0.0, 0.0, azimuth + FRAC_PI_2))
        .to_homogeneous();

    Ok(rz * (rx * Matrix4::identity()))
}

/// One integration step. Pure, so a failed read never touches the caller's state.
pub(crate) fn integrate(
    state: &OrientationState,
    now: f64,
    acc: Vector3<f64>,
    ang_v: Vector3<f64>,
) -> (OrientationState, CycleReading) {
    let dt = now - state.moment;

    // first order: the rotation vector over dt is used directly as Euler angles
    let att = ang_v * dt;
    let transformation =
        rotation_matrix(RotationAxis::BodyFixed, &att).to_homogeneous() * state.transformation;

    let g_in_body = transformation * world_up();
    let linear_acc = acc - g_in_body.xyz();

    let next = OrientationState {
        transformation,
        attitude: state.attitude + att,
        moment: now,
        linear_acc,
    };
    let reading = CycleReading {
        dt,
        acc,
        ang_v,
        linear_acc,
    };
    (next, reading)
}

/// Dead reckons the orientation of one sensor from its gyro.
///
/// Only one thread may drive an integrator; pacing the update calls at
/// `config.sampling_period()` is up to the caller.
pub struct OrientationIntegrator<S, C> {
    imu: CalibratedImu<S>,
    clock: C,
    config: OrientationConfig,
    state: OrientationState,
}

impl<S: RawImu, C: Clock> OrientationIntegrator<S, C> {
    pub fn new(
        imu: CalibratedImu<S>,
        clock: C,
        config: OrientationConfig,
    ) -> Result<Self, OrientationError> {
        config.validate()?;
        let state = OrientationState::new(clock.now_s());
        Ok(Self {
            imu,
            clock,
            config,
            state,
        })
    }

    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    pub fn transformation(&self) -> &Matrix4<f64> {
        &self.state.transformation
    }

    pub fn attitude(&self) -> &Vector3<f64> {
        &self.state.attitude
    }

    pub fn moment(&self) -> f64 {
        self.state.moment
    }

    pub fn imu_mut(&mut self) -> &mut CalibratedImu<S> {
        &mut self.imu
    }

    pub fn into_imu(self) -> CalibratedImu<S> {
        self.imu
    }

    /// Aligns the transform with gravity from `init_sample_count` readings
    /// taken one sampling period apart. The body must be still meanwhile;
    /// nothing checks that.
    pub fn set_init_transformation(&mut self) -> Result<(), OrientationError> {
        let period = self.config.sampling_period();
        let mut total = Vector3::<f64>::zeros();

        for _ in 0..self.config.init_sample_count {
            let cycle_start = self.clock.now_s();
            total += self.imu.get_acc()?;
            let elapsed = self.clock.now_s() - cycle_start;
            if let Some(remaining) = period.checked_sub(duration_from_secs(elapsed)) {
                self.clock.sleep(remaining);
            }
        }

        let g = total / self.config.init_sample_count as f64;
        let transformation = initial_transformation(&g)?;

        self.state.transformation = transformation;
        self.state.moment = self.clock.now_s();
        log::info!(
            "initial transformation set from mean gravity {:?}: {}",
            g.as_slice(),
            transformation
        );
        Ok(())
    }

    /// Advances the transform by one control cycle. Either the whole step is
    /// applied or, on a read failure, nothing is.
    pub fn update_transformation_matrix(&mut self) -> Result<CycleReading, OrientationError> {
        let now = self.clock.now_s();
        let acc = self.imu.get_acc()?;
        let ang_v = self.imu.get_ang_v()?;

        let (next, reading) = integrate(&self.state, now, acc, ang_v);
        self.state = next;

        log::trace!(
            "dt = {:.4}s, ang_v = {:?}, attitude = {:?}",
            reading.dt,
            reading.ang_v.as_slice(),
            self.state.attitude.as_slice()
        );
        Ok(reading)
    }
}

fn duration_from_secs(secs: f64) -> core::time::Duration {
    core::time::Duration::try_from_secs_f64(secs).unwrap_or_default()
}
