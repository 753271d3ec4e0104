//! Ray representation and basic ray-geometry tests.

use gray_kernel_math::{Aabb3, Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// The maximum travel distance is not part of the ray; every query takes
/// it separately.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::from_unit(origin, Dir3::new_normalize(direction))
    }

    /// Create a ray from an already normalized direction.
    pub fn from_unit(origin: Point3, direction: Dir3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Self {
            origin,
            direction,
            inv_direction: inv,
            sign,
        }
    }

    /// The direction as a plain vector.
    #[inline]
    pub fn dir(&self) -> &Vec3 {
        self.direction.as_ref()
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` (clamped to zero) and `t_max` are the entry and exit
    /// parameters. Returns `None` if no intersection.
    ///
    /// Handles infinite values correctly for axis-aligned rays.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let bounds = [aabb.min, aabb.max];
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let near = (bounds[self.sign[axis]][axis] - self.origin[axis]) * self.inv_direction[axis];
            let far =
                (bounds[1 - self.sign[axis]][axis] - self.origin[axis]) * self.inv_direction[axis];
            t_min = t_min.max(near);
            t_max = t_max.min(far);
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}
