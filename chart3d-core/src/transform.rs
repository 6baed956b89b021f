/// Orientation of the chart scene
use std::f64::consts::{PI, TAU};

use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion};

/// Wrap an angle into `(-PI, PI]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Euler angles (radians) applied about x, then y, then z.
///
/// Angles are kept wrapped so a chart left spinning never accumulates
/// precision loss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: wrap_angle(x),
            y: wrap_angle(y),
            z: wrap_angle(z),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Turn by the given deltas.
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        *self = Self::new(self.x + dx, self.y + dy, self.z + dz);
    }

    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.x, self.y, self.z)
    }

    pub fn rotate_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.quaternion() * point
    }
}

/// Scene to eye transform: rotate about the scene origin, then move the
/// scene `distance` units down the negative z axis.
pub fn view_transform(rotation: &RotationState, distance: f64) -> Matrix4<f64> {
    Isometry3::from_parts(Translation3::new(0.0, 0.0, -distance), rotation.quaternion()).to_homogeneous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_angles_wrap() {
        let mut state = RotationState::new(0.0, 3.0, -0.5);
        state.rotate(0.1, 0.3, -PI);
        assert!((state.x - 0.1).abs() < 1e-12);
        assert!((state.y - (3.3 - TAU)).abs() < 1e-12);
        assert!((state.z - (PI - 0.5)).abs() < 1e-12);
        assert_eq!(RotationState::new(PI, 0.0, 0.0).x, PI);
    }

    #[test]
    fn test_zero_rotation_keeps_points() {
        let p = Point3::new(1.0, -2.0, 3.0);
        assert!(close(&RotationState::zero().rotate_point(&p), &p));
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let rotation = RotationState::new(0.0, FRAC_PI_2, 0.0);
        let p = rotation.rotate_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(&p, &Point3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_view_transform_rotates_then_pushes_back() {
        let rotation = RotationState::new(FRAC_PI_2, 0.0, 0.0);
        let eye = view_transform(&rotation, 5.0).transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!(close(&eye, &Point3::new(0.0, 0.0, -4.0)));
    }
}
