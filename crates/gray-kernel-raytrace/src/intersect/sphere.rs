//! Ray-sphere intersection on squared distances.

use gray_kernel_math::{Aabb3, Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A sphere given by centre and radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    radius_sq: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius,
            radius_sq: radius * radius,
        }
    }

    /// Centre point.
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Move the sphere.
    pub fn set_center(&mut self, center: Point3) {
        self.center = center;
    }

    /// Change the radius.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.radius_sq = radius * radius;
    }

    /// Distance to the first crossing of a sphere within `max_dist`.
    ///
    /// Allocation-free form used by bounding-sphere tests. Grazing rays miss.
    pub fn quick_intersect(
        origin: &Point3,
        dir: &Vec3,
        max_dist: f64,
        center: &Point3,
        radius_sq: f64,
    ) -> Option<f64> {
        crossing(origin, dir, max_dist, center, radius_sq).map(|(t, _)| t)
    }

    /// Closest hit in `(0, max_dist)`.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let (t, face) = crossing(&ray.origin, ray.dir(), max_dist, &self.center, self.radius_sq)?;
        let point = ray.at(t);
        Some(SurfaceHit::new(ray, t, face, (point - self.center) / self.radius))
    }

    /// Extent of the sphere along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let cd = u.dot(&self.center.coords);
        (cd - self.radius, cd + self.radius)
    }

    /// Tight box around the part of the sphere inside `aabb`.
    ///
    /// Tangent touches and single-point contacts count as empty.
    pub fn extents_in_box(&self, aabb: &Aabb3) -> Option<Aabb3> {
        let min = aabb.min - self.center;
        let max = aabb.max - self.center;
        let sq: [(f64, f64); 3] = [0, 1, 2].map(|i| min_max_squares(min[i], max[i]));

        let mut extents = Aabb3::new(self.center, self.center);
        for axis in 0..3 {
            let (j, k) = ((axis + 1) % 3, (axis + 2) % 3);
            let (lo, hi) = axis_extent(
                min[axis],
                max[axis],
                self.radius_sq,
                sq[j].0 + sq[k].0,
                sq[j].1 + sq[k].1,
            )?;
            extents.min[axis] += lo;
            extents.max[axis] += hi;
        }
        Some(extents)
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.center = xf.apply_point(&self.center);
    }
}

/// Entering or exiting crossing of a sphere, if any lies in `(0, max_dist)`.
fn crossing(
    origin: &Point3,
    dir: &Vec3,
    max_dist: f64,
    center: &Point3,
    radius_sq: f64,
) -> Option<(f64, Face)> {
    let to_center = center - origin;
    // d: distance to the point on the line closest to the centre.
    // a_sq: squared distance from that point to the centre.
    let d = dir.dot(&to_center);
    let a_sq = (dir * d - to_center).norm_squared();
    if a_sq >= radius_sq {
        return None;
    }

    let b_sq = radius_sq - a_sq;
    let beyond = (d - max_dist) * (d - max_dist);
    if d > 0.0 && d * d > b_sq && (d < max_dist || b_sq > beyond) {
        Some((d - b_sq.sqrt(), Face::Front))
    } else if (d > 0.0 || d * d < b_sq) && d < max_dist && b_sq < beyond {
        Some((d + b_sq.sqrt(), Face::Back))
    } else {
        None
    }
}

/// Min and max of `x*x` over `[lo, hi]`.
fn min_max_squares(lo: f64, hi: f64) -> (f64, f64) {
    if lo < 0.0 && hi > 0.0 {
        (0.0, (lo * lo).max(hi * hi))
    } else {
        let (a, b) = (lo * lo, hi * hi);
        (a.min(b), a.max(b))
    }
}

/// Range of one coordinate (relative to the centre) over the sphere points
/// whose other two coordinates lie in the box.
///
/// `other_sq_min`/`other_sq_max` bound the sum of squares of those other
/// coordinates.
fn axis_extent(
    box_min: f64,
    box_max: f64,
    radius_sq: f64,
    other_sq_min: f64,
    other_sq_max: f64,
) -> Option<(f64, f64)> {
    let max_sq = radius_sq - other_sq_min;
    if max_sq < 0.0 {
        return None;
    }
    let max_pos = max_sq.sqrt();
    let min_sq = radius_sq - other_sq_max;
    let min_pos = if min_sq > 0.0 { min_sq.sqrt() } else { 0.0 };

    // Admissible values: [-max_pos, -min_pos] and [min_pos, max_pos].
    if max_pos <= box_min || -max_pos >= box_max {
        return None;
    }
    if box_min < -min_pos {
        let lo = box_min.max(-max_pos);
        let hi = if box_max > min_pos {
            box_max.min(max_pos)
        } else {
            box_max.min(-min_pos)
        };
        Some((lo, hi))
    } else if box_max > min_pos {
        Some((box_min.max(min_pos), box_max.min(max_pos)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_sphere() -> Sphere {
        Sphere::new(Point3::origin(), 1.0)
    }

    #[test]
    fn test_front_hit_from_outside() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
        let hit = unit_sphere().intersect(&ray, 100.0).unwrap();
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-12);
        assert_eq!(hit.face, Face::Front);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(hit.normal.into_inner(), -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_back_hit_from_inside() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.5), Vec3::z());
        let hit = unit_sphere().intersect(&ray, 100.0).unwrap();
        assert_relative_eq!(hit.t, 0.5, epsilon = 1e-12);
        assert_eq!(hit.face, Face::Back);
        assert!(ray.dir().dot(&hit.normal) > 0.0);
    }

    #[test]
    fn test_max_distance_cuts_off() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
        assert!(unit_sphere().intersect(&ray, 3.9).is_none());
        assert!(unit_sphere().intersect(&ray, 4.1).is_some());
    }

    #[test]
    fn test_sphere_behind_ray() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::z());
        assert!(unit_sphere().intersect(&ray, 100.0).is_none());
    }

    #[test]
    fn test_grazing_ray_misses() {
        let ray = Ray::new(Point3::new(1.0, 0.0, -5.0), Vec3::z());
        assert!(unit_sphere().intersect(&ray, 100.0).is_none());
        let inside = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::x());
        assert!(unit_sphere().intersect(&inside, 100.0).is_none());
    }

    #[test]
    fn test_quick_intersect_matches_member() {
        let s = Sphere::new(Point3::new(1.0, 2.0, 3.0), 1.5);
        let ray = Ray::new(Point3::new(-4.0, 1.0, 2.0), Vec3::new(1.0, 0.2, 0.1));
        let member = s.intersect(&ray, 50.0).unwrap();
        let quick = Sphere::quick_intersect(&ray.origin, ray.dir(), 50.0, s.center(), 2.25).unwrap();
        assert_eq!(member.t, quick);
    }

    #[test]
    fn test_bounding_planes() {
        let s = Sphere::new(Point3::new(1.0, 2.0, 3.0), 0.5);
        let (lo, hi) = s.bounding_planes(&Vec3::y());
        assert_relative_eq!(lo, 1.5);
        assert_relative_eq!(hi, 2.5);
    }

    #[test]
    fn test_extents_in_box_octant() {
        let b = Aabb3::new(Point3::origin(), Point3::new(5.0, 5.0, 5.0));
        let ext = unit_sphere().extents_in_box(&b).unwrap();
        assert_relative_eq!(ext.min, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(ext.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_extents_in_box_cap() {
        // Slab above z = 0.6 cuts a cap of radius 0.8.
        let b = Aabb3::new(Point3::new(-2.0, -2.0, 0.6), Point3::new(2.0, 2.0, 2.0));
        let ext = unit_sphere().extents_in_box(&b).unwrap();
        assert_relative_eq!(ext.min, Point3::new(-0.8, -0.8, 0.6), epsilon = 1e-12);
        assert_relative_eq!(ext.max, Point3::new(0.8, 0.8, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_extents_in_box_tangent_is_empty() {
        let b = Aabb3::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        assert!(unit_sphere().extents_in_box(&b).is_none());
        // Box corner just outside the sphere.
        let corner = Aabb3::new(Point3::new(0.6, 0.6, 0.6), Point3::new(2.0, 2.0, 2.0));
        assert!(unit_sphere().extents_in_box(&corner).is_none());
    }

    #[test]
    fn test_transform_moves_center() {
        let mut s = unit_sphere();
        s.transform(&RigidTransform::translation(0.0, 0.0, 2.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
        let hit = s.intersect(&ray, 100.0).unwrap();
        assert_relative_eq!(hit.t, 6.0, epsilon = 1e-12);
    }
}
