//! Ray-torus intersection (quartic equation).
//!
//! A bounding-box precheck in the torus frame rejects most rays and gives
//! a forward distance from which the quartic is set up, which keeps its
//! coefficients small for rays starting far away.

use gray_kernel_math::roots::{solve_quartic, Roots};
use gray_kernel_math::{ortho_basis, Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A ring torus: the set of points at distance `minor` from the circle of
/// radius `major` around the central axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Torus {
    center: Point3,
    /// Central axis `c` and radial axes `a`, `b` with `a × b = c`.
    axis_c: Vec3,
    axis_a: Vec3,
    axis_b: Vec3,
    major: f64,
    minor: f64,
}

impl Default for Torus {
    /// Major radius 2, minor radius 1, central axis `+y`.
    fn default() -> Self {
        Self::new(Point3::origin(), Vec3::y(), 2.0, 1.0)
    }
}

impl Torus {
    /// Create a torus around `axis` through `center`.
    pub fn new(center: Point3, axis: Vec3, major: f64, minor: f64) -> Self {
        let axis_c = axis.normalize();
        let (axis_a, axis_b) = ortho_basis(&axis_c);
        Self {
            center,
            axis_c,
            axis_a,
            axis_b,
            major,
            minor,
        }
    }

    /// Centre point.
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Unit central axis.
    pub fn axis(&self) -> &Vec3 {
        &self.axis_c
    }

    /// Major and minor radii.
    pub fn radii(&self) -> (f64, f64) {
        (self.major, self.minor)
    }

    /// Change the radii.
    pub fn set_radii(&mut self, major: f64, minor: f64) {
        self.major = major;
        self.minor = minor;
    }

    /// Entry distance of the ray into the torus' bounding box, if the ray
    /// meets the box before `max_dist`.
    fn box_entry(&self, ray: &Ray, max_dist: f64) -> Option<f64> {
        let rel = ray.origin - self.center;
        let outer = self.major + self.minor;
        let mut span = BoxSpan {
            max_front: f64::MIN,
            min_back: f64::MAX,
        };
        for (axis, half_width) in [(&self.axis_c, self.minor), (&self.axis_a, outer), (&self.axis_b, outer)] {
            if !span.collide(rel.dot(axis), ray.dir().dot(axis), half_width) {
                return None;
            }
        }
        (span.max_front <= max_dist).then_some(span.max_front)
    }

    /// Real roots of the ray's quartic, measured from the ray origin, in
    /// ascending order. Crossings behind the ray are included so that the
    /// root index keeps its parity.
    fn crossings(&self, ray: &Ray, move_fwd: f64) -> Roots {
        let u = ray.dir();
        let p = ray.at(move_fwd) - self.center;

        let udotp = u.dot(&p);
        let m_sq = self.major * self.major;
        let radii_sq_sum = m_sq + self.minor * self.minor;
        let ucdotp = self.axis_c.dot(&p);
        let ucdotu = self.axis_c.dot(u);
        let p_sq = p.norm_squared();

        let b = 4.0 * udotp;
        let c = 4.0 * udotp * udotp + 2.0 * p_sq - 2.0 * radii_sq_sum + 4.0 * m_sq * ucdotu * ucdotu;
        let d = 4.0 * ((p_sq - radii_sq_sum) * udotp + 2.0 * m_sq * ucdotp * ucdotu);
        let diff = m_sq - self.minor * self.minor;
        let e = (p_sq - 2.0 * radii_sq_sum) * p_sq + 4.0 * m_sq * ucdotp * ucdotp + diff * diff;

        solve_quartic(1.0, b, c, d, e)
    }

    /// Closest hit in `(0, max_dist)`.
    ///
    /// Even-indexed roots are entries (front face), odd-indexed exits.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let move_fwd = self.box_entry(ray, max_dist)?.max(0.0);
        for (i, root) in self.crossings(ray, move_fwd).iter().enumerate() {
            let t = root + move_fwd;
            if t >= max_dist {
                return None;
            }
            if t > 0.0 {
                return Some(self.hit_at(ray, t, i));
            }
        }
        None
    }

    /// Every crossing in front of the ray origin, nearest first.
    pub fn all_hits(&self, ray: &Ray) -> Vec<SurfaceHit> {
        let Some(entry) = self.box_entry(ray, f64::MAX) else {
            return Vec::new();
        };
        let move_fwd = entry.max(0.0);
        self.crossings(ray, move_fwd)
            .iter()
            .enumerate()
            .filter_map(|(i, root)| {
                let t = root + move_fwd;
                (t > 0.0).then(|| self.hit_at(ray, t, i))
            })
            .collect()
    }

    fn hit_at(&self, ray: &Ray, t: f64, root_index: usize) -> SurfaceHit {
        let face = if root_index % 2 == 0 { Face::Front } else { Face::Back };
        let q = ray.at(t) - self.center;
        let radial = q - self.axis_c * q.dot(&self.axis_c);
        let radial_dir = radial.try_normalize(0.0).unwrap_or(self.axis_a);
        SurfaceHit::new(ray, t, face, q - radial_dir * self.major)
    }

    /// Extent along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let center_dot = u.dot(&self.center.coords);
        let (ua, ub) = (u.dot(&self.axis_a), u.dot(&self.axis_b));
        let delta = self.major * (ua * ua + ub * ub).sqrt() + self.minor;
        (center_dot - delta, center_dot + delta)
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.center = xf.apply_point(&self.center);
        self.axis_c = xf.apply_vec(&self.axis_c);
        self.axis_a = xf.apply_vec(&self.axis_a);
        self.axis_b = xf.apply_vec(&self.axis_b);
    }
}

/// Entry/exit interval of a ray through a box centred on the origin.
struct BoxSpan {
    max_front: f64,
    min_back: f64,
}

impl BoxSpan {
    /// Narrow by the slab `|x·n| <= half_width`, given `pdotn = p·n` and
    /// `alpha = u·n`. Returns `false` once the interval is empty.
    fn collide(&mut self, pdotn: f64, alpha: f64, half_width: f64) -> bool {
        if alpha > 0.0 {
            if pdotn >= half_width {
                return false;
            }
            let below = half_width + pdotn;
            if below < 0.0 {
                // Enters through the bottom.
                if alpha * self.max_front < -below {
                    self.max_front = -below / alpha;
                }
                self.min_back = self.min_back.min((half_width - pdotn) / alpha);
                if self.max_front > self.min_back {
                    return false;
                }
            } else {
                let to_top = half_width - pdotn;
                if alpha * self.min_back > to_top {
                    self.min_back = to_top / alpha;
                    if self.max_front > self.min_back {
                        return false;
                    }
                }
            }
        } else if alpha < 0.0 {
            if pdotn <= -half_width {
                return false;
            }
            let above = pdotn - half_width;
            if above > 0.0 {
                // Enters through the top.
                if -alpha * self.max_front < above {
                    self.max_front = -above / alpha;
                }
                self.min_back = self.min_back.min(-(pdotn + half_width) / alpha);
                if self.max_front > self.min_back {
                    return false;
                }
            } else {
                let to_bottom = pdotn + half_width;
                if -alpha * self.min_back > to_bottom {
                    self.min_back = -to_bottom / alpha;
                    if self.max_front > self.min_back {
                        return false;
                    }
                }
            }
        } else if pdotn.abs() > half_width {
            return false;
        }
        true
    }
}
