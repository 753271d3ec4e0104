//! Ray-cylinder intersection: elliptical side bounded by two cap planes.

use gray_kernel_math::roots::{quadratic_is_linear, solve_quadratic};
use gray_kernel_math::{ortho_basis, Point3, RigidTransform, Vec3};

use crate::hit::{Face, SurfaceHit};
use crate::Ray;

/// A cap plane `normal·x = coef` with `normal` pointing out of the cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapPlane {
    /// Unit outward normal.
    pub normal: Vec3,
    /// Plane coefficient.
    pub coef: f64,
}

/// How the side surface is closed off.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Caps {
    /// Caps perpendicular to the axis at `±half_height` from the centre.
    Right { half_height: f64 },
    /// Arbitrary top and bottom planes.
    Planes { top: CapPlane, bottom: CapPlane },
}

/// Which part of the cylinder set a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Top,
    Bottom,
    Side,
}

/// A cylinder with elliptical cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    center: Point3,
    /// Unit central axis, pointing from bottom to top.
    axis: Vec3,
    /// Unit radial axes with `axis_a × axis_b = axis`.
    axis_a: Vec3,
    axis_b: Vec3,
    radius_a: f64,
    radius_b: f64,
    /// Radial axes divided by their radius.
    scaled_a: Vec3,
    scaled_b: Vec3,
    caps: Caps,
}

impl Cylinder {
    /// Right circular cylinder of the given total height, centred on `center`.
    pub fn new(center: Point3, axis: Vec3, radius: f64, height: f64) -> Self {
        let axis = axis.normalize();
        let (axis_a, axis_b) = ortho_basis(&axis);
        let mut cyl = Self {
            center,
            axis,
            axis_a,
            axis_b,
            radius_a: radius,
            radius_b: radius,
            scaled_a: Vec3::zeros(),
            scaled_b: Vec3::zeros(),
            caps: Caps::Right {
                half_height: 0.5 * height,
            },
        };
        cyl.rescale();
        cyl
    }

    /// Elliptical cross-section with radius `radius_a` along `axis_a`
    /// (made perpendicular to the central axis) and `radius_b` across.
    pub fn with_radii(mut self, axis_a: Vec3, radius_a: f64, radius_b: f64) -> Self {
        let a = (axis_a - self.axis * axis_a.dot(&self.axis)).normalize();
        self.axis_a = a;
        self.axis_b = self.axis.cross(&a);
        self.radius_a = radius_a;
        self.radius_b = radius_b;
        self.rescale();
        self
    }

    /// Replace the perpendicular caps by arbitrary planes. Both normals
    /// must point away from the cylinder.
    pub fn with_cap_planes(mut self, top: CapPlane, bottom: CapPlane) -> Self {
        self.caps = Caps::Planes { top, bottom };
        self
    }

    /// Whether the caps are perpendicular to the axis.
    pub fn is_right(&self) -> bool {
        matches!(self.caps, Caps::Right { .. })
    }

    fn rescale(&mut self) {
        self.scaled_a = self.axis_a / self.radius_a;
        self.scaled_b = self.axis_b / self.radius_b;
    }

    fn outward_normal(&self, part: Part, point: &Point3) -> Vec3 {
        match (part, self.caps) {
            (Part::Top, Caps::Right { .. }) => self.axis,
            (Part::Bottom, Caps::Right { .. }) => -self.axis,
            (Part::Top, Caps::Planes { top, .. }) => top.normal,
            (Part::Bottom, Caps::Planes { bottom, .. }) => bottom.normal,
            (Part::Side, _) => {
                let q = point - self.center;
                self.scaled_a * q.dot(&self.scaled_a) + self.scaled_b * q.dot(&self.scaled_b)
            }
        }
    }

    /// Closest hit in `(0, max_dist)`.
    pub fn intersect(&self, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
        let dir = ray.dir();
        let mut max_front = (f64::MIN, Part::Side);
        let mut min_back = (f64::MAX, Part::Side);

        match self.caps {
            Caps::Right { half_height } => {
                let pdotn = (ray.origin - self.center).dot(&self.axis);
                let udotn = dir.dot(&self.axis);
                if pdotn > half_height {
                    if udotn >= 0.0 {
                        // Above the top, pointing up.
                        return None;
                    }
                    max_front = ((half_height - pdotn) / udotn, Part::Top);
                    min_back = (-(half_height + pdotn) / udotn, Part::Bottom);
                } else if pdotn < -half_height {
                    if udotn <= 0.0 {
                        return None;
                    }
                    max_front = (-(half_height + pdotn) / udotn, Part::Bottom);
                    min_back = ((half_height - pdotn) / udotn, Part::Top);
                } else if udotn < 0.0 {
                    min_back = (-(half_height + pdotn) / udotn, Part::Bottom);
                } else if udotn > 0.0 {
                    min_back = ((half_height - pdotn) / udotn, Part::Top);
                }
            }
            Caps::Planes { top, bottom } => {
                for (plane, part) in [(top, Part::Top), (bottom, Part::Bottom)] {
                    let pdotn = plane.normal.dot(&ray.origin.coords);
                    let udotn = plane.normal.dot(dir);
                    if pdotn > plane.coef {
                        if udotn >= 0.0 {
                            // Outside this plane, pointing away.
                            return None;
                        }
                        let front = (plane.coef - pdotn) / udotn;
                        if front > min_back.0 {
                            return None;
                        }
                        if front > max_front.0 {
                            max_front = (front, part);
                        }
                    } else if pdotn < plane.coef && udotn > 0.0 {
                        let back = (plane.coef - pdotn) / udotn;
                        if back < max_front.0 {
                            return None;
                        }
                        if back < min_back.0 {
                            min_back = (back, part);
                        }
                    }
                }
            }
        }
        if max_front.0 > max_dist {
            return None;
        }

        // Side surface in the frame where the cross-section is the unit circle.
        let rel = ray.origin - self.center;
        let (pa, pb) = (rel.dot(&self.scaled_a), rel.dot(&self.scaled_b));
        let (ua, ub) = (dir.dot(&self.scaled_a), dir.dot(&self.scaled_b));
        let c = pa * pa + pb * pb - 1.0;
        let b = pa * ua + pb * ub;
        if c >= 0.0 && b > 0.0 {
            // Outside and moving away.
            return None;
        }
        let a = ua * ua + ub * ub;
        let linear = quadratic_is_linear(a, 2.0 * b, c);
        let roots = solve_quadratic(a, 2.0 * b, c);
        match *roots.as_slice() {
            [] => {
                // Parallel to the axis: inside the side surface or never touching it.
                if c >= 0.0 {
                    return None;
                }
            }
            [root] if linear => {
                // Almost parallel to the axis: a single crossing, entering
                // when moving inward and leaving when moving outward.
                if b > 0.0 {
                    if root < min_back.0 {
                        if root < max_front.0 {
                            return None;
                        }
                        min_back = (root, Part::Side);
                    }
                } else if root > max_front.0 {
                    if root > min_back.0 {
                        return None;
                    }
                    max_front = (root, Part::Side);
                }
            }
            [_] => {
                // Grazes the side.
                return None;
            }
            [near, .., far] => {
                if near > max_front.0 {
                    if near > min_back.0 {
                        return None;
                    }
                    max_front = (near, Part::Side);
                }
                if far < min_back.0 {
                    if far < max_front.0 {
                        return None;
                    }
                    min_back = (far, Part::Side);
                }
            }
        }

        let ((t, part), face) = if max_front.0 > 0.0 {
            (max_front, Face::Front)
        } else {
            (min_back, Face::Back)
        };
        if t >= max_dist || t <= 0.0 {
            return None;
        }
        let point = ray.at(t);
        Some(SurfaceHit::new(ray, t, face, self.outward_normal(part, &point)))
    }

    /// Extent along a unit direction.
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        let center_dot = u.dot(&self.center.coords);
        let axis_dot_u = self.axis.dot(u);
        match self.caps {
            Caps::Right { half_height } => {
                let ra = self.radius_a * self.axis_a.dot(u);
                let rb = self.radius_b * self.axis_b.dot(u);
                let delta = half_height * axis_dot_u.abs() + (ra * ra + rb * rb).sqrt();
                (center_dot - delta, center_dot + delta)
            }
            Caps::Planes { top, bottom } => {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for plane in [top, bottom] {
                    for dot in self.cap_extremes(u, axis_dot_u, &plane) {
                        lo = lo.min(dot);
                        hi = hi.max(dot);
                    }
                }
                (lo, hi)
            }
        }
    }

    /// Projections onto `u` of the two points of a cap ellipse extreme along `u`.
    fn cap_extremes(&self, u: &Vec3, axis_dot_u: f64, plane: &CapPlane) -> [f64; 2] {
        let perp = plane.normal.cross(u);
        let alpha = perp.dot(&self.axis_a);
        let beta = perp.dot(&self.axis_b);
        if alpha == 0.0 && beta == 0.0 {
            // u is normal to the cap.
            let d = plane.coef * u.dot(&plane.normal);
            return [d, d];
        }
        let (ra, rb) = (self.radius_a, self.radius_b);
        let ratio = ((alpha * rb).powi(2) + (beta * ra).powi(2)).sqrt();
        let x = -beta * ra * ra / ratio;
        let y = alpha * rb * rb / ratio;
        let axis_dot_n = self.axis.dot(&plane.normal);
        [1.0, -1.0].map(|s| {
            // Point on the side's central cross-section, slid along the
            // axis onto the cap plane.
            let trial = self.center + self.axis_a * (s * x) + self.axis_b * (s * y);
            trial.coords.dot(u)
                + (plane.coef - trial.coords.dot(&plane.normal)) * axis_dot_u / axis_dot_n
        })
    }

    /// Apply a rigid placement.
    pub fn transform(&mut self, xf: &RigidTransform) {
        self.center = xf.apply_point(&self.center);
        self.axis = xf.apply_vec(&self.axis);
        self.axis_a = xf.apply_vec(&self.axis_a);
        self.axis_b = xf.apply_vec(&self.axis_b);
        self.rescale();
        if let Caps::Planes { top, bottom } = &mut self.caps {
            let shift = xf.apply_point(&Point3::origin()).coords;
            for plane in [top, bottom] {
                plane.normal = xf.apply_vec(&plane.normal);
                plane.coef += plane.normal.dot(&shift);
            }
        }
    }
}
