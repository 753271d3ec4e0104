//! Best-first subdivision search over a patch set.
//!
//! Candidates are held on an approximately sorted stack, nearest entry
//! distance on top. Leaf patches are referenced by index into the set;
//! patches produced by splitting during a query live in a slot arena
//! owned by the scratch buffer and are removed as soon as they are popped.

use gray_kernel_math::{project, Point2};
use slotmap::{new_key_type, SlotMap};

use super::patch::BezierPatch;
use crate::config::BezierConfig;
use crate::error::IntersectError;
use crate::hit::{Face, SurfaceHit};
use crate::Ray;

new_key_type! {
    /// Handle of a split patch in a [`BezierScratch`] arena.
    pub struct PatchKey;
}

/// Where a candidate's patch lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchRef {
    /// Leaf patch of the set, by index.
    Leaf(usize),
    /// Patch split off during this query.
    Split(PatchKey),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    patch: PatchRef,
    t_in: f64,
    t_out: f64,
}

/// Per-worker working memory for Bezier queries.
///
/// Reused across queries; each query starts by clearing it. One scratch
/// buffer must not be shared between concurrent queries.
#[derive(Debug, Default)]
pub struct BezierScratch {
    stack: Vec<Candidate>,
    arena: SlotMap<PatchKey, BezierPatch>,
}

impl BezierScratch {
    /// Empty scratch buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch buffer with room for `capacity` candidates up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
            arena: SlotMap::with_capacity_and_key(capacity),
        }
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.arena.clear();
    }

    /// Insert a candidate, looking back at most `sort_range` entries for
    /// its place so that nearer entries stay on top.
    fn push(
        &mut self,
        candidate: Candidate,
        sort_range: usize,
        capacity: usize,
    ) -> Result<(), IntersectError> {
        if self.stack.len() >= capacity {
            return Err(IntersectError::CandidateStackOverflow { capacity });
        }
        let mut i = self.stack.len();
        let mut j = sort_range;
        while i > 0 && j > 0 {
            if candidate.t_in <= self.stack[i - 1].t_in {
                break;
            }
            i -= 1;
            j -= 1;
        }
        self.stack.insert(i, candidate);
        Ok(())
    }

    /// Closest hit on `leaves` in `(0, max_dist)`.
    pub(crate) fn search(
        &mut self,
        leaves: &[BezierPatch],
        ray: &Ray,
        max_dist: f64,
        config: &BezierConfig,
    ) -> Result<Option<SurfaceHit>, IntersectError> {
        self.clear();
        let capacity = config.candidate_capacity;

        for (index, leaf) in leaves.iter().enumerate() {
            if let Some((t_in, t_out)) = leaf.ppd().quick_intersect(ray, max_dist) {
                let sort_range = self.stack.len();
                let patch = PatchRef::Leaf(index);
                self.push(Candidate { patch, t_in, t_out }, sort_range, capacity)?;
            }
        }

        let mut best: Option<SurfaceHit> = None;
        while let Some(top) = self.stack.pop() {
            let split;
            let patch = match top.patch {
                PatchRef::Leaf(index) => &leaves[index],
                PatchRef::Split(key) => match self.arena.remove(key) {
                    Some(p) => {
                        split = p;
                        &split
                    }
                    None => continue,
                },
            };
            if best.is_some_and(|b| top.t_in >= b.t) {
                continue;
            }
            let ppd = patch.ppd();
            if ppd.extent_a() + ppd.extent_b() < config.min_patch_extent {
                continue;
            }

            // Split until deep enough or flat, not merely nice.
            let needs_recursion =
                patch.depth() < config.min_isect_recurse && ppd.extent_c() >= config.flat_depth;
            if !needs_recursion {
                let alpha = 0.5 * (top.t_in.max(0.0) + top.t_out.min(max_dist));
                debug_assert!(alpha >= 0.0);
                let guess = ray.at(alpha);
                let local = ppd.local_uv(&guess);
                let value = patch.eval(&local);
                let dist_sq = (project(&value) - guess).norm_squared();
                if dist_sq < config.loose_dist_sq
                    && (dist_sq < config.tight_dist_sq || ppd.extent_c() < config.flat_depth)
                {
                    if alpha > 0.0 && alpha < max_dist && alpha < best.map_or(f64::MAX, |b| b.t) {
                        let normal = patch.normal(&local, &value);
                        let face = Face::from_direction(ray.dir(), &normal);
                        let uv: Point2 = patch.global_uv(&local);
                        best = Some(SurfaceHit::new(ray, alpha, face, normal).with_uv(uv));
                    }
                    continue;
                }
            }

            let mut sort_range = 0;
            for half in patch.subdivide() {
                if let Some((t_in, t_out)) = half.ppd().quick_intersect(ray, max_dist) {
                    let key = self.arena.insert(half);
                    let candidate = Candidate {
                        patch: PatchRef::Split(key),
                        t_in,
                        t_out,
                    };
                    self.push(candidate, sort_range, capacity)?;
                    sort_range = 1;
                }
            }
        }
        Ok(best)
    }
}
