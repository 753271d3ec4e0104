//! The common interface of every solid shape.

use gray_kernel_math::{Aabb3, Point3, RigidTransform, Vec3};

use crate::bezier::{BezierScratch, BezierSet};
use crate::error::IntersectError;
use crate::hit::SurfaceHit;
use crate::intersect::{
    Cylinder, Ellipsoid, Parallelepiped, Parallelogram, Sphere, Torus, Triangle,
};
use crate::Ray;

/// Geometry that a ray can be traced against.
///
/// Queries take `&self` and never change the shape; placement happens
/// through [`transform`](Viewable::transform) before tracing starts.
pub trait Viewable {
    /// Closest hit strictly inside `(0, max_dist)`.
    ///
    /// Only subdivision surfaces use `scratch` or return an error.
    fn find_intersection(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<SurfaceHit>, IntersectError>;

    /// Min and max of `direction · x` over the shape, for a unit direction.
    fn bounding_planes(&self, direction: &Vec3) -> (f64, f64);

    /// Axis-aligned bounding box.
    fn aabb(&self) -> Aabb3 {
        let (x0, x1) = self.bounding_planes(&Vec3::x());
        let (y0, y1) = self.bounding_planes(&Vec3::y());
        let (z0, z1) = self.bounding_planes(&Vec3::z());
        Aabb3::new(Point3::new(x0, y0, z0), Point3::new(x1, y1, z1))
    }

    /// Bounding box of the part of the shape inside `aabb`.
    ///
    /// A box that only touches the shape's bounds gives `None`.
    fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
        let own = self.aabb();
        let clipped = own.intersection(aabb)?;
        let touching = (0..3).any(|i| clipped.min[i] == clipped.max[i] && own.min[i] < own.max[i]);
        (!touching).then_some(clipped)
    }

    /// Apply a rigid placement.
    fn transform(&mut self, xf: &RigidTransform);
}

/// Forward the trait to the inherent methods of analytic shapes. Shapes
/// listed after `tight:` also have their own `extents_in_box`.
macro_rules! impl_viewable {
    (@impl $ty:ty { $($extra:tt)* }) => {
        impl Viewable for $ty {
            fn find_intersection(
                &self,
                ray: &Ray,
                max_dist: f64,
                _scratch: &mut BezierScratch,
            ) -> Result<Option<SurfaceHit>, IntersectError> {
                Ok(self.intersect(ray, max_dist))
            }

            fn bounding_planes(&self, direction: &Vec3) -> (f64, f64) {
                <$ty>::bounding_planes(self, direction)
            }

            fn transform(&mut self, xf: &RigidTransform) {
                <$ty>::transform(self, xf)
            }

            $($extra)*
        }
    };
    (tight: $($ty:ty),* $(,)?) => {
        $(
            impl_viewable!(@impl $ty {
                fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
                    <$ty>::extents_in_box(self, aabb)
                }
            });
        )*
    };
    ($($ty:ty),* $(,)?) => {
        $( impl_viewable!(@impl $ty {}); )*
    };
}

impl_viewable!(Ellipsoid, Cylinder, Torus);
impl_viewable!(tight: Sphere, Triangle, Parallelogram, Parallelepiped);

impl Viewable for BezierSet {
    fn find_intersection(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<SurfaceHit>, IntersectError> {
        self.intersect(ray, max_dist, scratch)
    }

    fn bounding_planes(&self, direction: &Vec3) -> (f64, f64) {
        BezierSet::bounding_planes(self, direction)
    }

    fn transform(&mut self, xf: &RigidTransform) {
        BezierSet::transform(self, xf)
    }
}

/// Any of the supported shapes.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Sphere.
    Sphere(Sphere),
    /// Ellipsoid with arbitrary orthogonal axes.
    Ellipsoid(Ellipsoid),
    /// Capped elliptical cylinder.
    Cylinder(Cylinder),
    /// Torus.
    Torus(Torus),
    /// Triangle.
    Triangle(Triangle),
    /// Parallelogram.
    Parallelogram(Parallelogram),
    /// Parallelepiped.
    Parallelepiped(Parallelepiped),
    /// Rational Bezier patch set.
    BezierSet(BezierSet),
}

impl Shape {
    /// Shapes with no inside; hits from behind may be culled.
    pub fn is_flat(&self) -> bool {
        matches!(self, Shape::Triangle(_) | Shape::Parallelogram(_))
    }

    fn as_viewable(&self) -> &dyn Viewable {
        match self {
            Shape::Sphere(s) => s,
            Shape::Ellipsoid(s) => s,
            Shape::Cylinder(s) => s,
            Shape::Torus(s) => s,
            Shape::Triangle(s) => s,
            Shape::Parallelogram(s) => s,
            Shape::Parallelepiped(s) => s,
            Shape::BezierSet(s) => s,
        }
    }

    fn as_viewable_mut(&mut self) -> &mut dyn Viewable {
        match self {
            Shape::Sphere(s) => s,
            Shape::Ellipsoid(s) => s,
            Shape::Cylinder(s) => s,
            Shape::Torus(s) => s,
            Shape::Triangle(s) => s,
            Shape::Parallelogram(s) => s,
            Shape::Parallelepiped(s) => s,
            Shape::BezierSet(s) => s,
        }
    }
}

impl Viewable for Shape {
    fn find_intersection(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<SurfaceHit>, IntersectError> {
        self.as_viewable().find_intersection(ray, max_dist, scratch)
    }

    fn bounding_planes(&self, direction: &Vec3) -> (f64, f64) {
        self.as_viewable().bounding_planes(direction)
    }

    fn aabb(&self) -> Aabb3 {
        self.as_viewable().aabb()
    }

    fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
        self.as_viewable().extents_in_box(aabb)
    }

    fn transform(&mut self, xf: &RigidTransform) {
        self.as_viewable_mut().transform(xf)
    }
}

macro_rules! shape_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Shape::$variant(shape)
                }
            }
        )*
    };
}

shape_from!(
    Sphere,
    Ellipsoid,
    Cylinder,
    Torus,
    Triangle,
    Parallelogram,
    Parallelepiped,
    BezierSet,
);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_dispatch() {
        let shape = Shape::from(Sphere::new(Point3::new(0.0, 0.0, 5.0), 1.0));
        let ray = Ray::new(Point3::origin(), Vec3::z());
        let hit = shape
            .find_intersection(&ray, 100.0, &mut BezierScratch::new())
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-12);
        assert!(!shape.is_flat());
    }

    #[test]
    fn test_default_aabb_from_bounding_planes() {
        let torus = Torus::new(Point3::new(1.0, 0.0, 0.0), Vec3::z(), 2.0, 0.5);
        let aabb = Viewable::aabb(&torus);
        assert_relative_eq!(aabb.min, Point3::new(-1.5, -2.5, -0.5), epsilon = 1e-12);
        assert_relative_eq!(aabb.max, Point3::new(3.5, 2.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_default_extents_in_box() {
        let ellipsoid = Ellipsoid::new(Point3::origin(), 2.0, 1.0, 1.0);
        let inner = Aabb3::new(Point3::new(1.0, -5.0, -5.0), Point3::new(5.0, 5.0, 5.0));
        let ext = ellipsoid.extents_in_box(&inner).unwrap();
        assert_relative_eq!(ext.min.x, 1.0);
        assert_relative_eq!(ext.max.x, 2.0, epsilon = 1e-12);

        // Only touches the side of the bounding box.
        let touching = Aabb3::new(Point3::new(2.0, -5.0, -5.0), Point3::new(5.0, 5.0, 5.0));
        assert!(ellipsoid.extents_in_box(&touching).is_none());
    }

    #[test]
    fn test_flat_shapes() {
        let tri = Triangle::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert!(Shape::from(tri).is_flat());
        assert!(Shape::from(Parallelogram::default()).is_flat());
        assert!(!Shape::from(Parallelepiped::axis_aligned(Point3::origin(), Point3::new(1.0, 1.0, 1.0))).is_flat());
    }

    #[test]
    fn test_transform_through_shape() {
        let mut shape = Shape::from(Cylinder::new(Point3::origin(), Vec3::z(), 1.0, 2.0));
        shape.transform(&RigidTransform::translation(10.0, 0.0, 0.0));
        let aabb = shape.aabb();
        assert_relative_eq!(aabb.min.x, 9.0, epsilon = 1e-12);
        assert_relative_eq!(aabb.max.x, 11.0, epsilon = 1e-12);
    }
}
