//! Math utilities and types
//!
//! Provides fundamental math types for the scene graph and picking code.
//! Matrices are column-major (nalgebra), points are transformed as column
//! vectors, so `world = parent * local`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

use nalgebra::{Rotation3, UnitQuaternion};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Compose a `T * R * S` matrix by writing the elements directly.
///
/// Equivalent to `translation * rotation * scaling` without the two
/// intermediate 4x4 products.
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    let q = rotation.quaternion().coords;
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);
    let (sx, sy, sz) = (scale.x, scale.y, scale.z);

    let mut m = Mat4::zeros();

    m[(0, 0)] = (1.0 - (yy + zz)) * sx;
    m[(1, 0)] = (xy + wz) * sx;
    m[(2, 0)] = (xz - wy) * sx;

    m[(0, 1)] = (xy - wz) * sy;
    m[(1, 1)] = (1.0 - (xx + zz)) * sy;
    m[(2, 1)] = (yz + wx) * sy;

    m[(0, 2)] = (xz + wy) * sz;
    m[(1, 2)] = (yz - wx) * sz;
    m[(2, 2)] = (1.0 - (xx + yy)) * sz;

    m[(0, 3)] = position.x;
    m[(1, 3)] = position.y;
    m[(2, 3)] = position.z;
    m[(3, 3)] = 1.0;

    m
}

/// Decompose an affine matrix into position, rotation and scale.
///
/// Scale is the length of each basis column (the X scale is negated for
/// mirrored matrices); the rotation is extracted from the basis after
/// dividing the scale back out.
pub fn decompose_trs(matrix: &Mat4) -> (Vec3, Quat, Vec3) {
    let position = Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

    let mut sx = Vec3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)]).magnitude();
    let sy = Vec3::new(matrix[(0, 1)], matrix[(1, 1)], matrix[(2, 1)]).magnitude();
    let sz = Vec3::new(matrix[(0, 2)], matrix[(1, 2)], matrix[(2, 2)]).magnitude();

    let basis: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    if basis.determinant() < 0.0 {
        sx = -sx;
    }

    let inv = |s: f32| if s == 0.0 { 0.0 } else { 1.0 / s };
    let (ix, iy, iz) = (inv(sx), inv(sy), inv(sz));

    let rotation_matrix = Mat3::new(
        matrix[(0, 0)] * ix, matrix[(0, 1)] * iy, matrix[(0, 2)] * iz,
        matrix[(1, 0)] * ix, matrix[(1, 1)] * iy, matrix[(1, 2)] * iz,
        matrix[(2, 0)] * ix, matrix[(2, 1)] * iy, matrix[(2, 2)] * iz,
    );
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_matrix));

    (position, rotation, Vec3::new(sx, sy, sz))
}

/// Build a rotation from Euler angles (radians) applied in XYZ order,
/// i.e. `Rx * Ry * Rz`.
pub fn quat_from_euler_xyz(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::x_axis(), x)
        * Quat::from_axis_angle(&Vec3::y_axis(), y)
        * Quat::from_axis_angle(&Vec3::z_axis(), z)
}

/// Transform a point by a 4x4 matrix, including the perspective divide.
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Transform a direction by the upper 3x3 part of a 4x4 matrix.
pub fn transform_direction(matrix: &Mat4, direction: &Vec3) -> Vec3 {
    matrix.transform_vector(direction)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_matches_matrix_products() {
        let position = Vec3::new(1.0, -2.0, 3.5);
        let rotation = Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 1.0, 0.3)), 0.7);
        let scale = Vec3::new(2.0, 0.5, 1.5);

        let expected = Mat4::new_translation(&position)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&scale);

        assert_relative_eq!(compose_trs(&position, &rotation, &scale), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_decompose_recovers_components() {
        let position = Vec3::new(-4.0, 0.25, 9.0);
        let rotation = quat_from_euler_xyz(0.3, -1.1, 0.6);
        let scale = Vec3::new(1.5, 3.0, 0.75);

        let (p, r, s) = decompose_trs(&compose_trs(&position, &rotation, &scale));

        assert_relative_eq!(p, position, epsilon = 1e-5);
        assert_relative_eq!(s, scale, epsilon = 1e-5);
        // q and -q are the same rotation
        assert!(r.coords.dot(&rotation.coords).abs() > 0.9999, "rotation mismatch: {r:?} vs {rotation:?}");
    }

    #[test]
    fn test_euler_xyz_order() {
        let q = quat_from_euler_xyz(constants::HALF_PI, 0.0, constants::HALF_PI);
        // Rz first takes X to Y, then Rx takes Y to Z
        assert_relative_eq!(q * Vec3::x(), Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_transform_point_applies_translation_but_direction_does_not() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(transform_point(&m, &Vec3::zeros()), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(transform_direction(&m, &Vec3::x()), Vec3::x());
    }

    #[test]
    fn test_angle_conversions() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI);
        assert_relative_eq!(utils::rad_to_deg(constants::HALF_PI), 90.0, epsilon = 1e-4);
    }
}
