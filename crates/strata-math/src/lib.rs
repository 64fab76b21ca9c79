#![warn(missing_docs)]

//! Math types for the strata slicer.
//!
//! Thin wrappers around nalgebra providing the points, vectors, tolerance
//! constants and bounding boxes shared by the mesh and slicer crates.

use nalgebra::{Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// 2D cross product (z component of the 3D cross product).
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Area tolerance in mm², used to detect collapsed polygons.
    pub area: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, 1e-10 mm² area).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        area: 1e-10,
    };

    /// Check if two 2D points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Snap a 2D point onto the tolerance grid.
    ///
    /// Points that are bit-identical always share a key; points closer than
    /// `linear` share a key unless they straddle a grid line.
    pub fn snap(&self, p: &Point2) -> [i64; 2] {
        [
            (p.x / self.linear).round() as i64,
            (p.y / self.linear).round() as i64,
        ]
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Build the smallest AABB containing every point, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include_point(p);
        }
        (!bbox.is_empty()).then_some(bbox)
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another one.
    pub fn include(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Extent along Z.
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(1.0 + 1e-7, 2.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point2::new(1.001, 2.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_snap_identical_points() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(0.1 + 0.2, -3.5);
        let b = Point2::new(0.1 + 0.2, -3.5);
        assert_eq!(tol.snap(&a), tol.snap(&b));
        assert_ne!(tol.snap(&a), tol.snap(&Point2::new(0.3001, -3.5)));
    }

    #[test]
    fn test_cross2() {
        assert_eq!(cross2(&Vec2::x(), &Vec2::y()), 1.0);
        assert_eq!(cross2(&Vec2::y(), &Vec2::x()), -1.0);
    }

    #[test]
    fn test_aabb_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 4.0, 3.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let bbox = Aabb3::from_points(&pts).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -1.0));
        assert_eq!(bbox.max, Point3::new(1.0, 4.0, 3.0));
        assert_eq!(bbox.height(), 4.0);
        assert!(Aabb3::from_points(&[]).is_none());
    }

    #[test]
    fn test_aabb_include() {
        let mut a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        a.include(&b);
        assert_eq!(a.min, Point3::origin());
        assert_eq!(a.max, Point3::new(3.0, 3.0, 3.0));
        assert_eq!(a.height(), 3.0);

        let before = a;
        a.include(&Aabb3::empty());
        assert_eq!(a, before);
    }
}
