//! Rigid-body extrinsic transforms between sensor frames.
//!
//! Rotations read from a settings file are rarely perfectly orthonormal:
//! they come from external calibration tools and copy-pasted matrices with
//! truncated decimals. Every rotation is therefore projected to the nearest
//! proper orientation before it is stored, so downstream consumers can rely
//! on `R^T R = I` and `det R = 1`.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Rigid transform from a sensor frame to the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrinsic {
    /// Rotation taking sensor-frame vectors into the body frame.
    pub rotation: Matrix3<f64>,
    /// Sensor origin expressed in the body frame.
    pub translation: Vector3<f64>,
}

impl Default for Extrinsic {
    fn default() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }
}

impl Extrinsic {
    /// Build from raw matrix data, normalizing the rotation.
    pub fn from_raw(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation: nearest_rotation(&rotation),
            translation,
        }
    }

    /// Identity rotation, zero translation.
    pub fn identity() -> Self {
        Self::default()
    }
}

/// Project a matrix onto the nearest proper rotation.
///
/// Goes through a unit quaternion, which absorbs small orthonormality
/// errors in the input. Idempotent: a matrix that is already a rotation
/// maps to itself.
pub fn nearest_rotation(m: &Matrix3<f64>) -> Matrix3<f64> {
    UnitQuaternion::from_matrix(m)
        .to_rotation_matrix()
        .into_inner()
}
