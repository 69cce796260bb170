//! Ray and triangle primitives with intersection algorithms
//!
//! Rays are plain `Copy` values, so a picking pass builds them on the stack
//! instead of drawing from a pool.

use super::AABB;
use crate::foundation::math::{transform_direction, transform_point, Mat4, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray; need not be normalized
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction (kept as given)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray from `from` towards `to`, with a normalized direction
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self {
            origin: from,
            direction: (to - from).normalize(),
        }
    }

    /// Get a point along the ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed in the space `matrix` maps into
    ///
    /// The direction is transformed without translation and is not
    /// renormalized, so ray parameters stay comparable across spaces.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: transform_point(matrix, &self.origin),
            direction: transform_direction(matrix, &self.direction),
        }
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Returns the nearest intersection point in front of the origin, or
    /// `None`. When the origin starts inside the box the result is the
    /// point where the ray exits it.
    ///
    /// Zero direction components are not special-cased: the reciprocal is
    /// ±inf, which compares correctly against finite slab bounds. When the
    /// origin lies exactly on a slab plane `0 * inf` yields NaN; a NaN
    /// running bound is always replaced by the next axis' bound.
    pub fn intersect_box(&self, aabb: &AABB) -> Option<Vec3> {
        let origin = &self.origin;
        let inv_dir_x = 1.0 / self.direction.x;
        let inv_dir_y = 1.0 / self.direction.y;
        let inv_dir_z = 1.0 / self.direction.z;

        let (mut tmin, mut tmax) = if inv_dir_x >= 0.0 {
            ((aabb.min.x - origin.x) * inv_dir_x, (aabb.max.x - origin.x) * inv_dir_x)
        } else {
            ((aabb.max.x - origin.x) * inv_dir_x, (aabb.min.x - origin.x) * inv_dir_x)
        };

        let (tymin, tymax) = if inv_dir_y >= 0.0 {
            ((aabb.min.y - origin.y) * inv_dir_y, (aabb.max.y - origin.y) * inv_dir_y)
        } else {
            ((aabb.max.y - origin.y) * inv_dir_y, (aabb.min.y - origin.y) * inv_dir_y)
        };

        if tmin > tymax || tymin > tmax {
            return None;
        }

        if tymin > tmin || tmin.is_nan() {
            tmin = tymin;
        }
        if tymax < tmax || tmax.is_nan() {
            tmax = tymax;
        }

        let (tzmin, tzmax) = if inv_dir_z >= 0.0 {
            ((aabb.min.z - origin.z) * inv_dir_z, (aabb.max.z - origin.z) * inv_dir_z)
        } else {
            ((aabb.max.z - origin.z) * inv_dir_z, (aabb.min.z - origin.z) * inv_dir_z)
        };

        if tmin > tzmax || tzmin > tmax {
            return None;
        }

        if tzmin > tmin || tmin.is_nan() {
            tmin = tzmin;
        }
        if tzmax < tmax || tmax.is_nan() {
            tmax = tzmax;
        }

        // box is behind the ray
        if tmax < 0.0 {
            return None;
        }

        Some(self.at(if tmin >= 0.0 { tmin } else { tmax }))
    }

    /// Ray/triangle intersection using the edge/cross-product formulation
    /// (equivalent to Möller-Trumbore).
    ///
    /// With `backface_culling`, triangles whose counter-clockwise normal
    /// faces away from the ray are ignored. Rays parallel to the triangle's
    /// plane never hit.
    pub fn intersect_triangle(&self, a: &Vec3, b: &Vec3, c: &Vec3, backface_culling: bool) -> Option<Vec3> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(&edge2);

        // Solve origin + t * direction = a + b1 * edge1 + b2 * edge2 with
        // Cramer's rule, scaled so only one division remains.
        let mut d_dot_n = self.direction.dot(&normal);
        let sign = if d_dot_n > 0.0 {
            if backface_culling {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let d_dot_q_x_e2 = sign * self.direction.dot(&diff.cross(&edge2));
        if d_dot_q_x_e2 < 0.0 {
            return None;
        }

        let d_dot_e1_x_q = sign * self.direction.dot(&edge1.cross(&diff));
        if d_dot_e1_x_q < 0.0 {
            return None;
        }

        if d_dot_q_x_e2 + d_dot_e1_x_q > d_dot_n {
            return None;
        }

        // line/plane parameter, negative means behind the origin
        let q_dot_n = -sign * diff.dot(&normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }
}

/// A triangle for intersection tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculates the normal of the triangle (right-hand rule)
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).normalize()
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Intersect a ray with this triangle
    pub fn intersect_ray(&self, ray: &Ray, backface_culling: bool) -> Option<Vec3> {
        ray.intersect_triangle(&self.v0, &self.v1, &self.v2, backface_culling)
    }
}
