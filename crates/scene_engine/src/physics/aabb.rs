//! Axis-aligned bounding boxes

use crate::foundation::math::{transform_point, Mat4, Vec3};

/// Axis-Aligned Bounding Box
///
/// An empty box has `max < min` on some axis; [`AABB::empty`] starts at
/// `min = +inf`, `max = -inf` so that expanding by any point yields a box
/// containing just that point. Empty is distinct from a zero-size box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box containing no points
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Create an AABB centered at a point with given extents (half sizes)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing all `points`; empty if there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_by_point(point);
        }
        aabb
    }

    /// Whether no point has been expanded into the box
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to include `point`
    pub fn expand_by_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB, zero when empty
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// The eight corners, derived from the half sizes around the center
    pub fn corners(&self) -> [Vec3; 8] {
        let c = self.center();
        let e = (self.max - self.min) * 0.5;
        [
            Vec3::new(c.x - e.x, c.y - e.y, c.z - e.z),
            Vec3::new(c.x - e.x, c.y - e.y, c.z + e.z),
            Vec3::new(c.x - e.x, c.y + e.y, c.z - e.z),
            Vec3::new(c.x - e.x, c.y + e.y, c.z + e.z),
            Vec3::new(c.x + e.x, c.y - e.y, c.z - e.z),
            Vec3::new(c.x + e.x, c.y - e.y, c.z + e.z),
            Vec3::new(c.x + e.x, c.y + e.y, c.z - e.z),
            Vec3::new(c.x + e.x, c.y + e.y, c.z + e.z),
        ]
    }

    /// Axis-aligned box enclosing this box after transformation by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        let mut out = Self::empty();
        for corner in &self.corners() {
            out.expand_by_point(&transform_point(matrix, corner));
        }
        out
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_is_distinct_from_degenerate() {
        let empty = AABB::empty();
        assert!(empty.is_empty());
        assert!(!empty.contains_point(&Vec3::zeros()));

        let mut point_box = AABB::empty();
        point_box.expand_by_point(&Vec3::new(1.0, 2.0, 3.0));
        assert!(!point_box.is_empty());
        assert_eq!(point_box.size(), Vec3::zeros());
        assert!(point_box.contains_point(&Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_from_points() {
        let points = [Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, -4.0, 0.5)];
        let aabb = AABB::from_points(&points);
        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, 0.5));
        assert_eq!(aabb.max, Vec3::new(3.0, 0.0, 2.0));
        assert!(AABB::from_points(&[]).is_empty());
    }

    #[test]
    fn test_corners_cover_min_and_max() {
        let aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();
        assert!(corners.contains(&aabb.min));
        assert!(corners.contains(&aabb.max));
        assert_eq!(AABB::from_points(&corners), aabb);
    }

    #[test]
    fn test_transformed_by_rotation_grows() {
        let aabb = AABB::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let rotation = Mat4::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4);
        let rotated = aabb.transformed(&rotation);
        let half_diagonal = 2.0_f32.sqrt();
        assert_relative_eq!(rotated.max.x, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(rotated.max.z, 1.0, epsilon = 1e-5);
        assert!(AABB::empty().transformed(&rotation).is_empty());
    }

    #[test]
    fn test_intersects() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let c = AABB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(6.0, 6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
