//! Material and detector identifiers.
//!
//! The kernel never owns material data. It hands back indices into the
//! simulator's material table, and asks that table only whether a
//! material is sensitive.

/// Index of a material in the external material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Identifier of a detector element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectorId(pub u32);

/// Materials on the two sides of a solid's surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMaterials {
    /// Material on the outside, selected by front-face hits.
    pub front: MaterialId,
    /// Material on the inside, selected by back-face hits.
    ///
    /// `None` on a flat primitive culls hits from behind. On a closed
    /// solid it means the front material is used on both sides.
    pub back: Option<MaterialId>,
}

impl FaceMaterials {
    /// The same material on both sides.
    pub fn uniform(material: MaterialId) -> Self {
        Self {
            front: material,
            back: Some(material),
        }
    }

    /// Distinct outer and inner materials.
    pub fn new(front: MaterialId, back: MaterialId) -> Self {
        Self {
            front,
            back: Some(back),
        }
    }

    /// Front material only; flat primitives become one-sided.
    pub fn front_only(front: MaterialId) -> Self {
        Self { front, back: None }
    }
}

/// Read access to the simulator's material table.
pub trait MaterialLookup {
    /// Whether interactions in this material are recorded by a detector.
    fn is_sensitive(&self, material: MaterialId) -> bool;
}

impl MaterialLookup for [bool] {
    fn is_sensitive(&self, material: MaterialId) -> bool {
        self.get(material.0 as usize).copied().unwrap_or(false)
    }
}

impl MaterialLookup for Vec<bool> {
    fn is_sensitive(&self, material: MaterialId) -> bool {
        self.as_slice().is_sensitive(material)
    }
}
