//! Axis-aligned bounding boxes.
//!
//! Used to describe solid extents to the external spatial index and as a
//! cheap prefilter in front of the exact intersection tests.

use crate::Point3;

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

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        (!aabb.is_empty()).then_some(aabb)
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

    /// True when some axis has `min > max`.
    ///
    /// Flat boxes (`min == max` on an axis) are not empty: a triangle lying
    /// in a coordinate plane has one.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Test if a point lies inside or on the boundary.
    pub fn contains_point(&self, p: &Point3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Intersection of two boxes, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Aabb3) -> Option<Aabb3> {
        let clipped = Aabb3 {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        };
        (!clipped.is_empty()).then_some(clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-1.0, 3.0, 0.5),
            Point3::new(0.0, 0.0, -4.0),
        ];
        let aabb = Aabb3::from_points(&pts).unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, -4.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 0.5));
        assert!(Aabb3::from_points(&[]).is_none());
    }

    #[test]
    fn test_flat_box_is_not_empty() {
        let aabb = Aabb3::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(!aabb.is_empty());
        assert!(Aabb3::empty().is_empty());
    }

    #[test]
    fn test_intersection() {
        let a = Aabb3::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        let b = Aabb3::new(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));
        let c = a.intersection(&b).unwrap();
        assert_eq!(c.min, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(c.max, Point3::new(2.0, 2.0, 2.0));

        let far = Aabb3::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_contains_point() {
        let a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(a.contains_point(&Point3::new(0.5, 1.0, 0.0)));
        assert!(!a.contains_point(&Point3::new(0.5, 1.1, 0.0)));
    }
}
