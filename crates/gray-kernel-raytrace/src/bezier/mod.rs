//! Sets of rational Bezier patches intersected by adaptive subdivision.
//!
//! Each input patch is promoted to bicubic and cut into leaf patches whose
//! bounding parallelepipeds are thin. A query rejects against a bounding
//! sphere, then runs a best-first search in [`BezierScratch`] that keeps
//! splitting candidate patches until a point on the ray lies on the
//! surface to within the configured tolerances.

mod patch;
mod search;

pub use patch::{BezierPatch, BoundingPpd, ControlNet};
pub use search::{BezierScratch, PatchKey};

use std::sync::OnceLock;

use gray_kernel_math::{hpoint, project, HPoint, Point2, Point3, RigidTransform, Vec3};

use crate::config::BezierConfig;
use crate::error::IntersectError;
use crate::hit::SurfaceHit;
use crate::intersect::Sphere;
use crate::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingSphere {
    center: Point3,
    radius_sq: f64,
}

/// A surface made of rational bicubic Bezier patches.
#[derive(Debug, Clone, Default)]
pub struct BezierSet {
    leaves: Vec<BezierPatch>,
    patch_count: u32,
    next_uv_range: Option<(Point2, Point2)>,
    manual_center: Option<Point3>,
    bounding_sphere: OnceLock<BoundingSphere>,
    config: BezierConfig,
}

impl BezierSet {
    /// Empty set with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with the given tuning.
    pub fn with_config(config: BezierConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Tuning in use.
    pub fn config(&self) -> &BezierConfig {
        &self.config
    }

    /// Leaf patches after construction-time subdivision.
    pub fn leaves(&self) -> &[BezierPatch] {
        &self.leaves
    }

    /// Number of input patches added.
    pub fn patch_count(&self) -> u32 {
        self.patch_count
    }

    /// Parameter rectangle assigned to the next added patch. Defaults to
    /// the unit square.
    pub fn set_next_uv_range(&mut self, uv_min: Point2, uv_max: Point2) {
        self.next_uv_range = Some((uv_min, uv_max));
    }

    /// Fix the bounding sphere centre instead of using the control point mean.
    pub fn set_bounding_sphere_center(&mut self, center: Point3) {
        self.manual_center = Some(center);
        self.bounding_sphere = OnceLock::new();
    }

    /// Add a polynomial patch of order 3 or 4 in each direction.
    ///
    /// `points` is row-major over u: point `(i, j)` is at `i * v_order + j`.
    /// Returns the face number of the new patch.
    pub fn add_patch(
        &mut self,
        u_order: usize,
        v_order: usize,
        points: &[Point3],
    ) -> Result<u32, IntersectError> {
        let weighted: Vec<HPoint> = points.iter().map(|p| hpoint(p, 1.0)).collect();
        self.add_rational_patch(u_order, v_order, &weighted)
    }

    /// Add a rational patch from homogeneous control points laid out as in
    /// [`add_patch`](Self::add_patch).
    pub fn add_rational_patch(
        &mut self,
        u_order: usize,
        v_order: usize,
        points: &[HPoint],
    ) -> Result<u32, IntersectError> {
        if !(3..=4).contains(&u_order) || !(3..=4).contains(&v_order) {
            return Err(IntersectError::UnsupportedPatchOrder { u_order, v_order });
        }
        let expected = u_order * v_order;
        if points.len() != expected {
            return Err(IntersectError::ControlPointCount {
                expected,
                got: points.len(),
            });
        }

        let mut net: ControlNet = [[HPoint::zeros(); 4]; 4];
        for i in 0..u_order {
            for j in 0..v_order {
                net[i][j] = points[i * v_order + j];
            }
        }
        if u_order == 3 {
            for j in 0..v_order {
                let cubic = elevate(net[0][j], net[1][j], net[2][j]);
                for (i, q) in cubic.into_iter().enumerate() {
                    net[i][j] = q;
                }
            }
        }
        if v_order == 3 {
            for row in &mut net {
                let cubic = elevate(row[0], row[1], row[2]);
                row.copy_from_slice(&cubic);
            }
        }

        let face = self.patch_count;
        let (uv_min, uv_max) = self
            .next_uv_range
            .unwrap_or((Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)));
        let pieces = subdivide_until_nice(
            BezierPatch::new(net, face, uv_min, uv_max),
            self.config.max_construction_rounds,
        )?;
        self.leaves.extend(pieces);
        self.patch_count += 1;
        self.bounding_sphere = OnceLock::new();
        Ok(face)
    }

    fn bounding_sphere(&self) -> &BoundingSphere {
        self.bounding_sphere.get_or_init(|| {
            let center = self.manual_center.unwrap_or_else(|| self.mean_control_point());
            let radius_sq = self
                .control_points()
                .map(|p| (p - center).norm_squared())
                .fold(0.0, f64::max);
            BoundingSphere { center, radius_sq }
        })
    }

    fn control_points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.leaves
            .iter()
            .flat_map(|leaf| leaf.control_net().iter().flatten().map(project))
    }

    fn mean_control_point(&self) -> Point3 {
        let count = 16 * self.leaves.len();
        if count == 0 {
            return Point3::origin();
        }
        let sum = self.control_points().fold(Vec3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / count as f64)
    }

    /// Closest hit in `(0, max_dist)`, using `scratch` for the search.
    pub fn intersect(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<SurfaceHit>, IntersectError> {
        if self.leaves.is_empty() {
            return Ok(None);
        }
        let sphere = self.bounding_sphere();
        let starts_inside = (ray.origin - sphere.center).norm_squared() < sphere.radius_sq;
        if !starts_inside
            && Sphere::quick_intersect(&ray.origin, ray.dir(), max_dist, &sphere.center, sphere.radius_sq)
                .is_none()
        {
            return Ok(None);
        }
        scratch.search(&self.leaves, ray, max_dist, &self.config)
    }

    /// Extent along a unit direction.
    ///
    /// A set with no patches gives the empty interval `(+inf, -inf)`, so its
    /// [`aabb`](crate::Viewable::aabb) is [`Aabb3::empty`](gray_kernel_math::Aabb3::empty).
    pub fn bounding_planes(&self, u: &Vec3) -> (f64, f64) {
        self.leaves
            .iter()
            .map(|leaf| leaf.min_max_dot(u))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }

    /// Apply a rigid placement to every patch.
    pub fn transform(&mut self, xf: &RigidTransform) {
        for leaf in &mut self.leaves {
            leaf.transform(xf);
        }
        if let Some(center) = &mut self.manual_center {
            *center = xf.apply_point(center);
        }
        self.bounding_sphere = OnceLock::new();
    }
}

/// Degree-elevate a quadratic to the equivalent cubic.
fn elevate(p0: HPoint, p1: HPoint, p2: HPoint) -> [HPoint; 4] {
    [
        p0,
        p0 / 3.0 + p1 * (2.0 / 3.0),
        p1 * (2.0 / 3.0) + p2 / 3.0,
        p2,
    ]
}

/// Cut a patch four ways until every piece has a nice bounding box and no
/// point at infinity.
fn subdivide_until_nice(
    patch: BezierPatch,
    max_rounds: u32,
) -> Result<Vec<BezierPatch>, IntersectError> {
    let mut done = Vec::new();
    let mut pending = vec![patch];
    let mut rounds = 0;
    while !pending.is_empty() {
        let mut next = Vec::new();
        for piece in pending {
            if !piece.has_point_at_infinity() && piece.ppd().is_nice() {
                done.push(piece);
            } else {
                next.extend(piece.quarter());
            }
        }
        if !next.is_empty() {
            rounds += 1;
            if rounds > max_rounds {
                return Err(IntersectError::PatchNotConverging { rounds });
            }
        }
        pending = next;
    }
    Ok(done)
}
