//! Elementary and composite rotation matrices.
//!
//! Angles are always passed as an `(x, y, z)` triple in radians. The
//! elementary rotations only look at their own component; the composite
//! ones use all three.

use core::str::FromStr;

use nalgebra::{Matrix3, Vector3};

use crate::error::OrientationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
    /// Roll, pitch, yaw about the fixed world axes: `Rz * Ry * Rx`.
    WorldFixed,
    /// Intrinsic Euler sequence about the moving body axes: `Rx * Ry * Rz`.
    BodyFixed,
}

impl FromStr for RotationAxis {
    type Err = OrientationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(RotationAxis::X),
            "y" | "Y" => Ok(RotationAxis::Y),
            "z" | "Z" => Ok(RotationAxis::Z),
            "world" | "world_fixed" => Ok(RotationAxis::WorldFixed),
            "body" | "body_fixed" => Ok(RotationAxis::BodyFixed),
            _ => Err(OrientationError::InvalidAxis(s.into())),
        }
    }
}

pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s, //
        0.0, 1.0, 0.0, //
        -s, 0.0, c,
    )
}

pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

pub fn rotation_matrix(axis: RotationAxis, angles: &Vector3<f64>) -> Matrix3<f64> {
    match axis {
        RotationAxis::X => rotation_x(angles.x),
        RotationAxis::Y => rotation_y(angles.y),
        RotationAxis::Z => rotation_z(angles.z),
        RotationAxis::WorldFixed => {
            rotation_z(angles.z) * (rotation_y(angles.y) * rotation_x(angles.x))
        }
        RotationAxis::BodyFixed => {
            rotation_x(angles.x) * (rotation_y(angles.y) * rotation_z(angles.z))
        }
    }
}

/// Same as [`rotation_matrix`] but takes the axis as a token
/// (`x`, `y`, `z`, `world`, `body`).
pub fn rotation_matrix_by_name(
    axis: &str,
    angles: &Vector3<f64>,
) -> Result<Matrix3<f64>, OrientationError> {
    Ok(rotation_matrix(axis.parse()?, angles))
}
