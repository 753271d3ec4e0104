//! Hit records returned by intersection queries.

use gray_kernel_math::{Dir3, Point2, Point3, Vec3};

use crate::material::{DetectorId, MaterialId};
use crate::Ray;

/// Which side of a surface the ray struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// The ray arrived from outside (against the outward normal).
    Front,
    /// The ray arrived from inside (along the outward normal).
    Back,
}

impl Face {
    /// Face orientation of a ray direction relative to an outward normal.
    pub fn from_direction(direction: &Vec3, outward: &Vec3) -> Self {
        if direction.dot(outward) < 0.0 {
            Face::Front
        } else {
            Face::Back
        }
    }
}

/// Result of a ray-shape intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance along the ray.
    pub t: f64,
    /// Point struck.
    pub point: Point3,
    /// Side struck.
    pub face: Face,
    /// Outward unit normal at the point (front side for flat primitives).
    pub normal: Dir3,
    /// Surface parameters, for primitives that have a natural parameterization.
    pub uv: Option<Point2>,
}

impl SurfaceHit {
    /// Build a hit at distance `t`, normalizing `outward`.
    ///
    /// A vanishing normal (only possible on degenerate geometry) is replaced
    /// by the reversed ray direction so the record stays finite.
    pub fn new(ray: &Ray, t: f64, face: Face, outward: Vec3) -> Self {
        let normal = Dir3::try_new(outward, 0.0).unwrap_or_else(|| Dir3::new_unchecked(-ray.dir()));
        Self {
            t,
            point: ray.at(t),
            face,
            normal,
            uv: None,
        }
    }

    /// Attach surface parameters.
    pub fn with_uv(mut self, uv: Point2) -> Self {
        self.uv = Some(uv);
        self
    }
}

/// A hit on a [`Solid`](crate::Solid), resolved to the medium that governs
/// the interaction.
///
/// A plain value owned by the caller; it does not borrow the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePoint {
    /// Point struck.
    pub position: Point3,
    /// Outward unit normal.
    pub normal: Dir3,
    /// Surface parameters, when the primitive has them.
    pub uv: Option<Point2>,
    /// Side struck.
    pub face: Face,
    /// Material selected by the side struck.
    pub material: MaterialId,
    /// Detector element of the solid, if any.
    pub detector_id: Option<DetectorId>,
}

impl VisiblePoint {
    /// True for hits on the outside of the surface.
    pub fn is_front_face(&self) -> bool {
        self.face == Face::Front
    }
}
