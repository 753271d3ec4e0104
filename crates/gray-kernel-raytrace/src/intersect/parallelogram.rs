//! Ray-parallelogram intersection.

use gray_kernel_math::clip::polygon_extents_in_box;
use gray_kernel_math::{Aabb3, Point2, Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A parallelogram given by three counter-clockwise vertices `a`, `b`, `c`;
/// the fourth is `d = a + (c - b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parallelogram {
    a: Point3,
    b: Point3,
    c: Point3,
    normal: Vec3,
    plane_coef: f64,
    /// In-plane normals to edges `ab` and `bc`.
    normal_ab: Vec3,
    normal_bc: Vec3,
    coef_ab: f64,
    coef_bc: f64,
    coef_cd: f64,
    coef_da: f64,
}

impl Default for Parallelogram {
    /// Unit square in the `z = 0` plane, facing `+z`.
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0))
    }
}

impl Parallelogram {
    /// Create from three counter-clockwise vertices.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        let mut pg = Self {
            a,
            b,
            c,
            normal: Vec3::zeros(),
            plane_coef: 0.0,
            normal_ab: Vec3::zeros(),
            normal_bc: Vec3::zeros(),
            coef_ab: 0.0,
            coef_bc: 0.0,
            coef_cd: 0.0,
            coef_da: 0.0,
        };
        pg.pre_calc();
        pg
    }

    /// The four corners `a`, `b`, `c`, `d`.
    pub fn vertices(&self) -> [Point3; 4] {
        [self.a, self.b, self.c, self.a + (self.c - self.b)]
    }

    /// Unit normal on the front side.
    pub fn normal(&self) -> &Vec3 {
        &self.normal
    }

    fn pre_calc(&mut self) {
        let unit = |v: Vec3| v.try_normalize(0.0).unwrap_or_else(Vec3::zeros);
        let ab = unit(self.b - self.a);
        let bc = unit(self.c - self.b);
        self.normal = unit(ab.cross(&bc));
        self.plane_coef = self.b.coords.dot(&self.normal);

        self.normal_ab = self.normal.cross(&ab);
        self.normal_bc = self.normal.cross(&bc);
        self.coef_ab = self.a.coords.dot(&self.normal_ab);
        self.coef_bc = self.b.coords.dot(&self.normal_bc);
        self.coef_cd = self.c.coords.dot(&self.normal_ab);
        self.coef_da = self.a.coords.dot(&self.normal_bc);
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
        let q = ray.at(t);
        let along_ab = q.coords.dot(&self.normal_ab);
        if along_ab < self.coef_ab || along_ab > self.coef_cd {
            return None;
        }
        let along_bc = q.coords.dot(&self.normal_bc);
        if along_bc < self.coef_bc || along_bc > self.coef_da {
            return None;
        }

        // u runs from edge da to edge bc, v from edge ab to edge cd.
        let u = (self.coef_da - along_bc) / (self.coef_da - self.coef_bc);
        let v = (along_ab - self.coef_ab) / (self.coef_cd - self.coef_ab);
        Some(SurfaceHit::new(ray, t, face, self.normal).with_uv(Point2::new(u, v)))
    }

    /// Extent along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let start = u.dot(&self.b.coords);
        let (mut lo, mut hi) = (start, start);
        for t in [u.dot(&(self.c - self.b)), u.dot(&(self.a - self.b))] {
            if t < 0.0 {
                lo += t;
            } else {
                hi += t;
            }
        }
        (lo, hi)
    }

    /// Tight box around the part of the parallelogram inside `aabb`.
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn slanted() -> Parallelogram {
        // d = (1, 2, 0)
        Parallelogram::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
        )
    }

    #[test]
    fn test_fourth_vertex() {
        assert_relative_eq!(slanted().vertices()[3], Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_hit_inside_with_uv() {
        let pg = Parallelogram::default();
        let ray = Ray::new(Point3::new(0.25, 0.75, 2.0), -Vec3::z());
        let hit = pg.intersect(&ray, 10.0).unwrap();
        assert_relative_eq!(hit.t, 2.0, epsilon = 1e-12);
        assert_eq!(hit.face, Face::Front);
        let uv = hit.uv.unwrap();
        assert_relative_eq!(uv.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(uv.y, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_slanted_edges() {
        let pg = slanted();
        // Inside near the slanted left edge.
        let inside = Ray::new(Point3::new(0.9, 1.5, 1.0), -Vec3::z());
        assert!(pg.intersect(&inside, 10.0).is_some());
        // Left of the slanted edge from a to d.
        let outside = Ray::new(Point3::new(0.5, 1.5, 1.0), -Vec3::z());
        assert!(pg.intersect(&outside, 10.0).is_none());
        // Just left of the slanted edge from b to c.
        let right = Ray::new(Point3::new(2.7, 1.5, 1.0), -Vec3::z());
        assert!(pg.intersect(&right, 10.0).is_some());
        let beyond = Ray::new(Point3::new(2.9, 0.5, 1.0), -Vec3::z());
        assert!(pg.intersect(&beyond, 10.0).is_none());
    }

    #[test]
    fn test_back_face() {
        let ray = Ray::new(Point3::new(0.5, 0.5, -1.0), Vec3::z());
        let hit = Parallelogram::default().intersect(&ray, 10.0).unwrap();
        assert_eq!(hit.face, Face::Back);
    }

    #[test]
    fn test_bounding_planes() {
        let (lo, hi) = slanted().bounding_planes(&Vec3::x());
        assert_relative_eq!(lo, 0.0);
        assert_relative_eq!(hi, 3.0);
    }

    #[test]
    fn test_extents_in_box() {
        let b = Aabb3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.5, 1.0, 1.0));
        let ext = slanted().extents_in_box(&b).unwrap();
        assert_relative_eq!(ext.min, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(ext.max, Point3::new(1.5, 1.0, 0.0), epsilon = 1e-12);
    }
}
