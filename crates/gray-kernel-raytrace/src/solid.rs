//! Solids: shapes with materials, and the scene-level closest-hit query.

use std::cell::RefCell;

use gray_kernel_math::Aabb3;

use crate::bezier::BezierScratch;
use crate::error::IntersectError;
use crate::hit::{Face, VisiblePoint};
use crate::material::{DetectorId, FaceMaterials, MaterialId, MaterialLookup};
use crate::viewable::{Shape, Viewable};
use crate::Ray;

thread_local! {
    static SCRATCH: RefCell<BezierScratch> = RefCell::new(BezierScratch::new());
}

/// A shape placed in the scene with the materials on either side of it.
#[derive(Debug, Clone)]
pub struct Solid {
    shape: Shape,
    materials: FaceMaterials,
    detector_id: Option<DetectorId>,
}

impl Solid {
    /// Solid with the given materials and no detector.
    pub fn new(shape: impl Into<Shape>, materials: FaceMaterials) -> Self {
        Self {
            shape: shape.into(),
            materials,
            detector_id: None,
        }
    }

    /// Solid filled with a single material.
    pub fn uniform(shape: impl Into<Shape>, material: MaterialId) -> Self {
        Self::new(shape, FaceMaterials::uniform(material))
    }

    /// Tag the solid as a detector element.
    pub fn with_detector(mut self, id: DetectorId) -> Self {
        self.detector_id = Some(id);
        self
    }

    /// Underlying geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable geometry, for placement before tracing.
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Materials on either side.
    pub fn materials(&self) -> &FaceMaterials {
        &self.materials
    }

    /// Detector element, if any.
    pub fn detector_id(&self) -> Option<DetectorId> {
        self.detector_id
    }

    /// Material governing a hit on the given side, or `None` when the hit
    /// is culled.
    fn material_for(&self, face: Face) -> Option<MaterialId> {
        match (face, self.materials.back) {
            (Face::Front, _) => Some(self.materials.front),
            (Face::Back, Some(back)) => Some(back),
            (Face::Back, None) if self.shape.is_flat() => None,
            (Face::Back, None) => Some(self.materials.front),
        }
    }

    /// Closest visible hit in `(0, max_dist)` and its distance.
    pub fn find_intersection_in(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<(f64, VisiblePoint)>, IntersectError> {
        debug_assert!(max_dist >= 0.0, "negative max distance {max_dist}");
        let Some(hit) = self.shape.find_intersection(ray, max_dist, scratch)? else {
            return Ok(None);
        };
        let Some(material) = self.material_for(hit.face) else {
            return Ok(None);
        };
        let point = VisiblePoint {
            position: hit.point,
            normal: hit.normal,
            uv: hit.uv,
            face: hit.face,
            material,
            detector_id: self.detector_id,
        };
        Ok(Some((hit.t, point)))
    }

    /// [`find_intersection_in`](Self::find_intersection_in) using a
    /// per-thread scratch buffer.
    pub fn find_intersection(
        &self,
        ray: &Ray,
        max_dist: f64,
    ) -> Result<Option<(f64, VisiblePoint)>, IntersectError> {
        SCRATCH.with(|scratch| self.find_intersection_in(ray, max_dist, &mut scratch.borrow_mut()))
    }
}

/// Closest hit over a [`SolidList`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    /// Index of the solid struck.
    pub solid: usize,
    /// Distance along the ray.
    pub t: f64,
    /// Hit details.
    pub point: VisiblePoint,
}

/// An immutable collection of solids traced as one scene.
#[derive(Debug, Clone, Default)]
pub struct SolidList {
    solids: Vec<Solid>,
    bounds: Vec<Aabb3>,
}

impl SolidList {
    /// Freeze a list of solids already placed in world space.
    pub fn new(solids: Vec<Solid>) -> Self {
        let bounds = solids.iter().map(|s| s.shape.aabb()).collect();
        Self { solids, bounds }
    }

    /// Number of solids.
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// True when there are no solids.
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Solid by index.
    pub fn get(&self, index: usize) -> Option<&Solid> {
        self.solids.get(index)
    }

    /// Iterate over the solids.
    pub fn iter(&self) -> impl Iterator<Item = &Solid> {
        self.solids.iter()
    }

    /// Closest hit over all solids in `(0, max_dist)`.
    ///
    /// Each solid is queried only up to the best distance found so far;
    /// solids whose bounding box the ray misses are skipped.
    pub fn closest_intersection(
        &self,
        ray: &Ray,
        max_dist: f64,
        scratch: &mut BezierScratch,
    ) -> Result<Option<SceneHit>, IntersectError> {
        let mut best: Option<SceneHit> = None;
        let mut limit = max_dist;
        for (index, (solid, bounds)) in self.solids.iter().zip(&self.bounds).enumerate() {
            match ray.intersect_aabb(bounds) {
                Some((t_enter, _)) if t_enter < limit => {}
                _ => continue,
            }
            if let Some((t, point)) = solid.find_intersection_in(ray, limit, scratch)? {
                limit = t;
                best = Some(SceneHit {
                    solid: index,
                    t,
                    point,
                });
            }
        }
        Ok(best)
    }

    /// Detector that records a hit, only if the material struck is sensitive.
    pub fn sensitive_detector<M>(&self, hit: &VisiblePoint, materials: &M) -> Option<DetectorId>
    where
        M: MaterialLookup + ?Sized,
    {
        hit.detector_id.filter(|_| materials.is_sensitive(hit.material))
    }
}

impl FromIterator<Solid> for SolidList {
    fn from_iter<I: IntoIterator<Item = Solid>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
