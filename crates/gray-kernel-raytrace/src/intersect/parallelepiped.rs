//! Ray-parallelepiped intersection by slab narrowing.

use gray_kernel_math::clip::polygon_extents_in_box;
use gray_kernel_math::{Aabb3, Point3, RigidTransform, Vec3};

use super::slab::{intersect_slabs, Slab, SlabSpan};
use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A parallelepiped spanned by vertex `a` and its three neighbours `b`, `c`, `d`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parallelepiped {
    a: Point3,
    b: Point3,
    c: Point3,
    d: Point3,
    /// Slabs normal to `ab × ac`, `ab × ad` and `ad × ac`.
    slabs: [Slab; 3],
}

impl Parallelepiped {
    /// Create from a corner and its three adjacent vertices.
    pub fn new(a: Point3, b: Point3, c: Point3, d: Point3) -> Self {
        let mut ppd = Self {
            a,
            b,
            c,
            d,
            slabs: [Slab::new(Vec3::zeros(), 0.0, 0.0); 3],
        };
        ppd.calc_planes();
        ppd
    }

    /// Axis-aligned box between two corners.
    pub fn axis_aligned(min: Point3, max: Point3) -> Self {
        Self::new(
            min,
            Point3::new(max.x, min.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
        )
    }

    /// The vertices `a`, `b`, `c`, `d`.
    pub fn vertices(&self) -> [Point3; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// The three bounding slabs.
    pub fn slabs(&self) -> &[Slab; 3] {
        &self.slabs
    }

    fn calc_planes(&mut self) {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ad = self.d - self.a;

        let n_abc = ab.cross(&ac).normalize();
        let n_abd = ab.cross(&ad).normalize();
        let n_acd = ad.cross(&ac).normalize();
        self.slabs = [
            Slab::new(n_abc, n_abc.dot(&self.a.coords), n_abc.dot(&self.d.coords)),
            Slab::new(n_abd, n_abd.dot(&self.c.coords), n_abd.dot(&self.a.coords)),
            Slab::new(n_acd, n_acd.dot(&self.b.coords), n_acd.dot(&self.a.coords)),
        ];
    }

    /// Entry and exit distances of a ray through three slabs.
    ///
    /// Allocation-free form shared with Bezier patch bounds.
    pub fn quick_intersect_slabs(
        origin: &Point3,
        dir: &Vec3,
        max_dist: f64,
        slabs: &[Slab; 3],
    ) -> Option<(f64, f64)> {
        intersect_slabs(origin, dir, max_dist, slabs)
    }

    /// Entry and exit distances through this parallelepiped.
    pub fn quick_intersect(&self, ray: &Ray, max_dist: f64) -> Option<(f64, f64)> {
        Self::quick_intersect_slabs(&ray.origin, ray.dir(), max_dist, &self.slabs)
    }

    /// Closest hit in `(0, max_dist)`.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let mut span = SlabSpan::new();
        for (k, slab) in self.slabs.iter().enumerate() {
            if !span.clip(&ray.origin, ray.dir(), slab, 2 * k, max_dist) {
                return None;
            }
        }

        let (t, face, plane) = if span.max_front > 0.0 {
            (span.max_front, Face::Front, span.front_plane)
        } else if span.min_back > 0.0 && span.min_back < max_dist {
            (span.min_back, Face::Back, span.back_plane)
        } else {
            return None;
        };
        Some(SurfaceHit::new(ray, t, face, self.outward_normal(plane)))
    }

    /// Outward normal of face `plane` (upper planes even, lower planes odd).
    fn outward_normal(&self, plane: usize) -> Vec3 {
        let n = self.slabs[plane / 2].normal;
        if plane % 2 == 0 {
            n
        } else {
            -n
        }
    }

    /// Extent along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let start = u.dot(&self.a.coords);
        let (mut lo, mut hi) = (start, start);
        for v in [&self.b, &self.c, &self.d] {
            let t = u.dot(&v.coords) - start;
            if t < 0.0 {
                lo += t;
            } else {
                hi += t;
            }
        }
        (lo, hi)
    }

    /// Tight box around the part of the surface inside `aabb`.
    pub fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ad = self.d - self.a;
        let a = self.a;
        let faces = [
            [a, a + ab, a + ab + ac, a + ac],
            [a + ad, a + ab + ad, a + ab + ac + ad, a + ac + ad],
            [a, a + ac, a + ac + ad, a + ad],
            [a + ab, a + ab + ac, a + ab + ac + ad, a + ab + ad],
            [a, a + ab, a + ab + ad, a + ad],
            [a + ac, a + ab + ac, a + ab + ac + ad, a + ac + ad],
        ];
        let clipped = faces
            .iter()
            .filter_map(|face| polygon_extents_in_box(face, aabb))
            .reduce(|mut acc, ext| {
                acc.include_point(&ext.min);
                acc.include_point(&ext.max);
                acc
            })?;
        // A box resting against one face only shares a flat patch with the solid.
        let own = [Vec3::x(), Vec3::y(), Vec3::z()].map(|u| self.bounding_planes(&u));
        let touching = (0..3).any(|i| clipped.min[i] == clipped.max[i] && own[i].0 < own[i].1);
        (!touching).then_some(clipped)
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.a = xf.apply_point(&self.a);
        self.b = xf.apply_point(&self.b);
        self.c = xf.apply_point(&self.c);
        self.d = xf.apply_point(&self.d);
        self.calc_planes();
    }
}
