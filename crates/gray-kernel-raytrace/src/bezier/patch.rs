//! A single rational bicubic Bezier patch and its bounding parallelepiped.

use gray_kernel_math::{project, HPoint, Point2, Point3, RigidTransform, Vec3};

use crate::intersect::{intersect_slabs, Slab};
use crate::Ray;

/// 4×4 homogeneous control net indexed `[i][j]`, `i` running along u.
pub type ControlNet = [[HPoint; 4]; 4];

/// Components at or below this count as zero when picking a derivative.
const DERIV_ZERO: f64 = 1e-25;

/// Parallelepiped bounding a patch's control points.
///
/// Slab `A` runs across the u direction, `B` across v, and `C` is the
/// depth direction, roughly the patch normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingPpd {
    /// Slabs `[A, B, C]`.
    pub slabs: [Slab; 3],
    /// True when the corner diagonals gave no usable frame and the world
    /// axes were used instead.
    pub degenerate: bool,
}

impl BoundingPpd {
    /// Bound a control net using the frame spanned by its corner diagonals.
    pub fn from_control_net(net: &ControlNet) -> Self {
        let p00 = project(&net[0][0]);
        let p30 = project(&net[3][0]);
        let p33 = project(&net[3][3]);
        let p03 = project(&net[0][3]);
        let diag1 = p33 - p00;
        let diag2 = p03 - p30;

        let c = diag1.cross(&diag2);
        let a = (diag1 + diag2).cross(&c);
        let b = c.cross(&(diag1 - diag2));

        let units = [a, b, c].map(|n| n.try_normalize(0.0));
        let (normals, degenerate) = match units {
            [Some(a), Some(b), Some(c)] => ([a, b, c], false),
            _ => ([Vec3::z(), Vec3::x(), Vec3::y()], true),
        };
        let slabs = normals.map(|n| {
            let (lo, hi) = min_max_dot(net, &n);
            Slab::new(n, lo, hi)
        });
        Self { slabs, degenerate }
    }

    /// Width across the u direction.
    pub fn extent_a(&self) -> f64 {
        self.slabs[0].thickness()
    }

    /// Width across the v direction.
    pub fn extent_b(&self) -> f64 {
        self.slabs[1].thickness()
    }

    /// Depth of the patch.
    pub fn extent_c(&self) -> f64 {
        self.slabs[2].thickness()
    }

    /// Thin enough relative to its width that subdivision can stop.
    pub fn is_nice(&self) -> bool {
        let dc = self.extent_c();
        !self.degenerate && dc < 0.5 * self.extent_a() && dc < 0.5 * self.extent_b()
    }

    /// Entry and exit distances of the ray through the box.
    pub fn quick_intersect(&self, ray: &Ray, max_dist: f64) -> Option<(f64, f64)> {
        intersect_slabs(&ray.origin, ray.dir(), max_dist, &self.slabs)
    }

    /// Fractional position of `p` across the A and B slabs.
    pub fn local_uv(&self, p: &Point3) -> Point2 {
        let [a, b, _] = &self.slabs;
        Point2::new(
            (p.coords.dot(&a.normal) - a.min_dot) / a.thickness(),
            (p.coords.dot(&b.normal) - b.min_dot) / b.thickness(),
        )
    }
}

/// Min and max of `n · x` over the projected control points.
fn min_max_dot(net: &ControlNet, n: &Vec3) -> (f64, f64) {
    net.iter()
        .flatten()
        .map(|cp| n.dot(&cp.xyz()) / cp.w)
        .fold((f64::MAX, f64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

/// Split a cubic at `t` into seven points; `[0..4]` and `[3..7]` are the halves.
fn de_casteljau(p: &[HPoint; 4], t: f64) -> [HPoint; 7] {
    let p01 = p[0].lerp(&p[1], t);
    let p12 = p[1].lerp(&p[2], t);
    let p23 = p[2].lerp(&p[3], t);
    let p012 = p01.lerp(&p12, t);
    let p123 = p12.lerp(&p23, t);
    let mid = p012.lerp(&p123, t);
    [p[0], p01, p012, mid, p123, p23, p[3]]
}

/// Homogeneous derivative of a cubic at `t`.
///
/// Falls back to the second and then third difference where the first
/// vanishes, as happens at collapsed corners.
fn deriv4(p: &[HPoint; 4], t: f64) -> HPoint {
    let is_zero = |v: &HPoint| v.iter().all(|c| c.abs() <= DERIV_ZERO);
    let d1 = [p[1] - p[0], p[2] - p[1], p[3] - p[2]];
    let first = d1[0].lerp(&d1[1], t).lerp(&d1[1].lerp(&d1[2], t), t);
    if !is_zero(&first) {
        return first * 3.0;
    }
    let d2 = [d1[1] - d1[0], d1[2] - d1[1]];
    let second = d2[0].lerp(&d2[1], t);
    if !is_zero(&second) {
        return second * 6.0;
    }
    (d2[1] - d2[0]) * 6.0
}

/// Euclidean derivative of the projected curve given its homogeneous
/// value and derivative.
fn rational_deriv(value: &HPoint, deriv: &HPoint) -> Vec3 {
    (deriv.xyz() * value.w - value.xyz() * deriv.w) / (value.w * value.w)
}

/// A rational bicubic Bezier patch.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPatch {
    net: ControlNet,
    ppd: BoundingPpd,
    depth: u32,
    uv_min: Point2,
    uv_max: Point2,
    face: u32,
}

impl BezierPatch {
    /// Wrap a control net covering `uv_min..uv_max` of input patch `face`.
    pub fn new(net: ControlNet, face: u32, uv_min: Point2, uv_max: Point2) -> Self {
        Self {
            ppd: BoundingPpd::from_control_net(&net),
            net,
            depth: 0,
            uv_min,
            uv_max,
            face,
        }
    }

    /// Control points.
    pub fn control_net(&self) -> &ControlNet {
        &self.net
    }

    /// Bounding parallelepiped.
    pub fn ppd(&self) -> &BoundingPpd {
        &self.ppd
    }

    /// Number of query-time splits since the leaf patch.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Index of the input patch this piece came from.
    pub fn face(&self) -> u32 {
        self.face
    }

    /// Parameter rectangle covered, in the input patch's parameters.
    pub fn uv_range(&self) -> (Point2, Point2) {
        (self.uv_min, self.uv_max)
    }

    /// Any control point with zero weight.
    pub fn has_point_at_infinity(&self) -> bool {
        self.net.iter().flatten().any(|cp| cp.w == 0.0)
    }

    /// Split at `u = ½`. Depth is unchanged.
    pub fn split_u(&self) -> [BezierPatch; 2] {
        let mut lo = self.net;
        let mut hi = self.net;
        for j in 0..4 {
            let column = [self.net[0][j], self.net[1][j], self.net[2][j], self.net[3][j]];
            let out = de_casteljau(&column, 0.5);
            for i in 0..4 {
                lo[i][j] = out[i];
                hi[i][j] = out[i + 3];
            }
        }
        let u_half = 0.5 * (self.uv_min.x + self.uv_max.x);
        [
            self.child(lo, self.uv_min, Point2::new(u_half, self.uv_max.y)),
            self.child(hi, Point2::new(u_half, self.uv_min.y), self.uv_max),
        ]
    }

    /// Split at `v = ½`. Depth is unchanged.
    pub fn split_v(&self) -> [BezierPatch; 2] {
        let mut lo = self.net;
        let mut hi = self.net;
        for i in 0..4 {
            let out = de_casteljau(&self.net[i], 0.5);
            lo[i].copy_from_slice(&out[..4]);
            hi[i].copy_from_slice(&out[3..]);
        }
        let v_half = 0.5 * (self.uv_min.y + self.uv_max.y);
        [
            self.child(lo, self.uv_min, Point2::new(self.uv_max.x, v_half)),
            self.child(hi, Point2::new(self.uv_min.x, v_half), self.uv_max),
        ]
    }

    /// Split one level deeper during a query, alternating u and v.
    pub fn subdivide(&self) -> [BezierPatch; 2] {
        let mut halves = if self.depth % 2 == 0 {
            self.split_u()
        } else {
            self.split_v()
        };
        for half in &mut halves {
            half.depth = self.depth + 1;
        }
        halves
    }

    /// Four-way split used while building leaf patches.
    pub fn quarter(&self) -> [BezierPatch; 4] {
        let [u0, u1] = self.split_u();
        let [u0v0, u0v1] = u0.split_v();
        let [u1v0, u1v1] = u1.split_v();
        [u0v0, u0v1, u1v0, u1v1]
    }

    fn child(&self, net: ControlNet, uv_min: Point2, uv_max: Point2) -> BezierPatch {
        BezierPatch {
            ppd: BoundingPpd::from_control_net(&net),
            net,
            depth: self.depth,
            uv_min,
            uv_max,
            face: self.face,
        }
    }

    /// Columns of the net evaluated at `u`, one per `j`.
    fn row_at_u(&self, u: f64) -> [HPoint; 4] {
        std::array::from_fn(|j| {
            let column = [self.net[0][j], self.net[1][j], self.net[2][j], self.net[3][j]];
            de_casteljau(&column, u)[3]
        })
    }

    /// Rows of the net evaluated at `v`, one per `i`.
    fn column_at_v(&self, v: f64) -> [HPoint; 4] {
        std::array::from_fn(|i| de_casteljau(&self.net[i], v)[3])
    }

    /// Homogeneous surface point at local parameters `uv` in `[0, 1]²`.
    pub fn eval(&self, uv: &Point2) -> HPoint {
        de_casteljau(&self.column_at_v(uv.y), uv.x)[3]
    }

    /// Normal `∂u × ∂v` at `uv`, given the value there. Falls back to the
    /// bounding box depth axis when the partials are parallel.
    pub fn normal(&self, uv: &Point2, value: &HPoint) -> Vec3 {
        let du = rational_deriv(value, &deriv4(&self.column_at_v(uv.y), uv.x));
        let dv = rational_deriv(value, &deriv4(&self.row_at_u(uv.x), uv.y));
        let n = du.cross(&dv);
        if n.norm_squared() > 0.0 && n.iter().all(|c| c.is_finite()) {
            n
        } else {
            self.ppd.slabs[2].normal
        }
    }

    /// Map local parameters to the input patch's parameters.
    pub fn global_uv(&self, local: &Point2) -> Point2 {
        Point2::new(
            self.uv_min.x + local.x * (self.uv_max.x - self.uv_min.x),
            self.uv_min.y + local.y * (self.uv_max.y - self.uv_min.y),
        )
    }

    /// Min and max of `n · x` over the control points.
    pub fn min_max_dot(&self, n: &Vec3) -> (f64, f64) {
        min_max_dot(&self.net, n)
    }

    /// Apply a rigid placement and refresh the bounds.
    pub fn transform(&mut self, xf: &RigidTransform) {
        for cp in self.net.iter_mut().flatten() {
            *cp = xf.apply_hpoint(cp);
        }
        self.ppd = BoundingPpd::from_control_net(&self.net);
    }
}
