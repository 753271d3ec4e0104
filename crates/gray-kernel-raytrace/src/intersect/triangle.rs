//! Ray-triangle intersection with barycentric inside test.

use gray_kernel_math::clip::polygon_extents_in_box;
use gray_kernel_math::{Aabb3, Point2, Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A triangle. The front side is the one `(b - a) × (c - b)` points to,
/// i.e. the side from which the vertices appear counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    a: Point3,
    b: Point3,
    c: Point3,
    normal: Vec3,
    plane_coef: f64,
    u_beta: Vec3,
    u_gamma: Vec3,
}

impl Triangle {
    /// Create from three counter-clockwise vertices.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        let mut tri = Self {
            a,
            b,
            c,
            normal: Vec3::zeros(),
            plane_coef: 0.0,
            u_beta: Vec3::zeros(),
            u_gamma: Vec3::zeros(),
        };
        tri.pre_calc();
        tri
    }

    /// The three vertices.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Unit normal on the front side.
    pub fn normal(&self) -> &Vec3 {
        &self.normal
    }

    fn pre_calc(&mut self) {
        let ab = self.b - self.a;
        let bc = self.c - self.b;
        let ca = self.a - self.c;

        // Cross the pair of edges meeting at the least obtuse corner.
        let n = if ab.dot(&bc) < bc.dot(&ca) {
            ab.cross(&bc)
        } else {
            bc.cross(&ca)
        };
        self.normal = n.try_normalize(0.0).unwrap_or_else(Vec3::zeros);
        self.plane_coef = self.normal.dot(&self.a.coords);

        // Gram matrix inverse for barycentric coordinates relative to a.
        let aa = ab.norm_squared();
        let bb = ab.dot(&ca);
        let cc = ca.norm_squared();
        let det = aa * cc - bb * bb;
        let d_inv = if det != 0.0 { 1.0 / det } else { 0.0 };
        let (aa, bb, cc) = (aa * d_inv, bb * d_inv, cc * d_inv);

        self.u_beta = ab * cc - ca * bb;
        self.u_gamma = ab * bb - ca * aa;
    }

    /// Closest hit in `(0, max_dist)` from either side.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let mdotn = ray.dir().dot(&self.normal);
        let planar_dist = ray.origin.coords.dot(&self.normal) - self.plane_coef;

        let face = if mdotn <= 0.0 {
            if planar_dist <= 0.0 || planar_dist >= -max_dist * mdotn {
                return None;
            }
            Face::Front
        } else {
            if planar_dist >= 0.0 || -planar_dist >= max_dist * mdotn {
                return None;
            }
            Face::Back
        };

        let t = -planar_dist / mdotn;
        let v = ray.at(t) - self.a;
        let beta = v.dot(&self.u_beta);
        if beta < 0.0 {
            return None;
        }
        let gamma = v.dot(&self.u_gamma);
        if gamma < 0.0 || beta + gamma > 1.0 {
            return None;
        }

        Some(SurfaceHit::new(ray, t, face, self.normal).with_uv(Point2::new(beta, gamma)))
    }

    /// Extent along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let dots = [self.a, self.b, self.c].map(|p| u.dot(&p.coords));
        (dots[0].min(dots[1]).min(dots[2]), dots[0].max(dots[1]).max(dots[2]))
    }

    /// Tight box around the part of the triangle inside `aabb`.
    pub fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
        polygon_extents_in_box(&self.vertices(), aabb)
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.a = xf.apply_point(&self.a);
        self.b = xf.apply_point(&self.b);
        self.c = xf.apply_point(&self.c);
        self.pre_calc();
    }
}
