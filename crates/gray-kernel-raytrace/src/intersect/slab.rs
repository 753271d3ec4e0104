//! Ray clipping against pairs of parallel planes.
//!
//! A slab is the region `min_dot <= n·x <= max_dot`. Intersecting a ray
//! with three slabs gives its entry and exit distances through a
//! parallelepiped; the same routine bounds Bezier patches.

use gray_kernel_math::{Point3, Vec3};

/// The region between two parallel planes, `min_dot <= normal·x <= max_dot`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    /// Unit plane normal.
    pub normal: Vec3,
    /// Lower plane coefficient.
    pub min_dot: f64,
    /// Upper plane coefficient.
    pub max_dot: f64,
}

impl Slab {
    /// Create a slab, swapping the coefficients if needed so `min_dot <= max_dot`.
    pub fn new(normal: Vec3, a: f64, b: f64) -> Self {
        Self {
            normal,
            min_dot: a.min(b),
            max_dot: a.max(b),
        }
    }

    /// Distance between the two planes.
    pub fn thickness(&self) -> f64 {
        self.max_dot - self.min_dot
    }
}

/// Running entry/exit interval of a ray narrowed slab by slab.
///
/// Planes are numbered `2k` for the upper and `2k + 1` for the lower plane
/// of slab `k`; the plane numbers that set the current bounds are tracked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlabSpan {
    /// Largest entry distance so far.
    pub max_front: f64,
    /// Plane that set `max_front`.
    pub front_plane: usize,
    /// Smallest exit distance so far.
    pub min_back: f64,
    /// Plane that set `min_back`.
    pub back_plane: usize,
}

impl SlabSpan {
    pub fn new() -> Self {
        Self {
            max_front: f64::MIN,
            front_plane: 0,
            min_back: f64::MAX,
            back_plane: 0,
        }
    }

    /// Narrow the interval by one slab. Returns `false` as soon as the
    /// interval is empty or its entry lies beyond `max_dist`.
    pub fn clip(&mut self, origin: &Point3, dir: &Vec3, slab: &Slab, plane: usize, max_dist: f64) -> bool {
        let top = slab.max_dot;
        let bottom = slab.min_dot;
        let pdotn = origin.coords.dot(&slab.normal);
        let udotn = dir.dot(&slab.normal);

        if udotn > 0.0 {
            if pdotn > top {
                // Above the top, pointing up.
                return false;
            }
            if bottom - pdotn >= 0.0 {
                // Enters through the bottom plane.
                let front = (bottom - pdotn) / udotn;
                if front > self.max_front {
                    if front > self.min_back || front > max_dist {
                        return false;
                    }
                    self.max_front = front;
                    self.front_plane = plane + 1;
                }
            }
            let back = (top - pdotn) / udotn;
            if back < self.min_back {
                if back < self.max_front {
                    return false;
                }
                self.min_back = back;
                self.back_plane = plane;
            }
        } else if udotn < 0.0 {
            if pdotn < bottom {
                // Below the bottom, pointing down.
                return false;
            }
            if top - pdotn <= 0.0 {
                // Enters through the top plane.
                let front = (top - pdotn) / udotn;
                if front > self.max_front {
                    if front > self.min_back || front > max_dist {
                        return false;
                    }
                    self.max_front = front;
                    self.front_plane = plane;
                }
            }
            let back = (bottom - pdotn) / udotn;
            if back < self.min_back {
                if back < self.max_front {
                    return false;
                }
                self.min_back = back;
                self.back_plane = plane + 1;
            }
        } else if pdotn < bottom || pdotn > top {
            return false;
        }
        true
    }

    /// Like [`clip`](Self::clip), but a zero-thickness slab is treated as a
    /// single plane the ray must cross inside the current interval.
    pub fn clip_checked(
        &mut self,
        origin: &Point3,
        dir: &Vec3,
        slab: &Slab,
        plane: usize,
        max_dist: f64,
    ) -> bool {
        if slab.min_dot < slab.max_dot {
            return self.clip(origin, dir, slab, plane, max_dist);
        }
        let pdotn = origin.coords.dot(&slab.normal);
        let udotn = dir.dot(&slab.normal);
        if udotn == 0.0 {
            // Parallel: only a ray lying in the plane survives, unconstrained.
            return pdotn == slab.max_dot;
        }
        let hit = (slab.max_dot - pdotn) / udotn;
        if hit < 0.0 || hit > max_dist || hit < self.max_front || hit > self.min_back {
            return false;
        }
        self.max_front = hit;
        self.min_back = hit;
        self.front_plane = plane;
        self.back_plane = plane;
        true
    }
}

/// Entry and exit distances of a ray through the intersection of three slabs.
///
/// Returns `None` when the ray misses or would only enter beyond
/// `max_dist`. The entry distance is negative when the origin is inside.
/// Zero-thickness slabs are handled as single planes.
pub fn intersect_slabs(origin: &Point3, dir: &Vec3, max_dist: f64, slabs: &[Slab; 3]) -> Option<(f64, f64)> {
    let mut span = SlabSpan::new();
    for (k, slab) in slabs.iter().enumerate() {
        if !span.clip_checked(origin, dir, slab, 2 * k, max_dist) {
            return None;
        }
    }
    debug_assert!(span.min_back >= 0.0);
    Some((span.max_front, span.min_back))
}
