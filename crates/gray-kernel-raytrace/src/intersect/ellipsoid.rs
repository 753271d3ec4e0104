//! Ray-ellipsoid intersection.
//!
//! The ray is mapped into the frame where the ellipsoid is the unit
//! sphere (each axis divided by its radius) and the resulting quadratic is
//! solved there. Distances are unchanged by the mapping because the
//! parameter along the ray is preserved.

use gray_kernel_math::roots::solve_quadratic;
use gray_kernel_math::{Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// An ellipsoid with three orthogonal semi-axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    center: Point3,
    /// Unit axes `a`, `b`, `c` with `b = c × a`.
    axes: [Vec3; 3],
    radii: [f64; 3],
    /// Axes divided by their radius.
    scaled: [Vec3; 3],
}

impl Ellipsoid {
    /// Axis-aligned ellipsoid: `a` along x, `b` along y, `c` along z.
    pub fn new(center: Point3, radius_a: f64, radius_b: f64, radius_c: f64) -> Self {
        let mut e = Self {
            center,
            axes: [Vec3::x(), Vec3::y(), Vec3::z()],
            radii: [radius_a, radius_b, radius_c],
            scaled: [Vec3::zeros(); 3],
        };
        e.rescale();
        e
    }

    /// Orient the ellipsoid. `axis_c` is the central axis; `axis_a` is
    /// made perpendicular to it, and `b = c × a` completes the frame.
    pub fn with_axes(mut self, axis_c: Vec3, axis_a: Vec3) -> Self {
        let c = axis_c.normalize();
        let a = (axis_a - c * axis_a.dot(&c)).normalize();
        self.axes = [a, c.cross(&a), c];
        self.rescale();
        self
    }

    /// Centre point.
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Radii along `a`, `b`, `c`.
    pub fn radii(&self) -> [f64; 3] {
        self.radii
    }

    /// Change the radii along `a`, `b`, `c`.
    pub fn set_radii(&mut self, radius_a: f64, radius_b: f64, radius_c: f64) {
        self.radii = [radius_a, radius_b, radius_c];
        self.rescale();
    }

    fn rescale(&mut self) {
        for i in 0..3 {
            self.scaled[i] = self.axes[i] / self.radii[i];
        }
    }

    /// Closest hit in `(0, max_dist)`. Tangent rays miss.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let rel = ray.origin - self.center;
        let p = self.scaled.map(|axis| rel.dot(&axis));
        let u = self.scaled.map(|axis| ray.dir().dot(&axis));

        let c = p[0] * p[0] + p[1] * p[1] + p[2] * p[2] - 1.0;
        let b = p[0] * u[0] + p[1] * u[1] + p[2] * u[2];
        if c > 0.0 && b >= 0.0 {
            // Outside and pointing away.
            return None;
        }
        let a = u[0] * u[0] + u[1] * u[1] + u[2] * u[2];

        let roots = solve_quadratic(a, 2.0 * b, c);
        let &[near, far] = roots.as_slice() else {
            return None;
        };
        let (t, face) = if near > 0.0 {
            if near >= max_dist {
                return None;
            }
            (near, Face::Front)
        } else if far > 0.0 && far < max_dist {
            (far, Face::Back)
        } else {
            return None;
        };

        let q = ray.at(t) - self.center;
        let normal = (0..3).fold(Vec3::zeros(), |n, i| n + self.scaled[i] * q.dot(&self.scaled[i]));
        Some(SurfaceHit::new(ray, t, face, normal))
    }

    /// Extent of the ellipsoid along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let center_dot = u.dot(&self.center.coords);
        let delta = (0..3)
            .map(|i| {
                let d = self.radii[i] * u.dot(&self.axes[i]);
                d * d
            })
            .sum::<f64>()
            .sqrt();
        (center_dot - delta, center_dot + delta)
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.center = xf.apply_point(&self.center);
        self.axes = self.axes.map(|axis| xf.apply_vec(&axis));
        self.rescale();
    }
}
