//! Ray-primitive intersection algorithms.
//!
//! Each primitive returns the closest crossing strictly inside
//! `(0, max_dist)` together with the side struck. Degenerate
//! configurations are misses.

mod cylinder;
mod ellipsoid;
mod parallelepiped;
mod parallelogram;
mod slab;
mod sphere;
mod torus;
mod triangle;

pub use cylinder::{CapPlane, Cylinder};
pub use ellipsoid::Ellipsoid;
pub use parallelepiped::Parallelepiped;
pub use parallelogram::Parallelogram;
pub use slab::{intersect_slabs, Slab};
pub use sphere::Sphere;
pub use torus::Torus;
pub use triangle::Triangle;
