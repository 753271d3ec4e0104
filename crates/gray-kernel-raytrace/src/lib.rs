#![warn(missing_docs)]

//! Ray/primitive intersection kernel for the Gray photon-transport simulator.
//!
//! Every photon step asks one question: travelling from here in this
//! direction for at most this far, which surface is struck first, from
//! which side, and what material lies beyond it?
//!
//! # Architecture
//!
//! - [`Ray`] - origin and unit direction
//! - [`intersect`] - closed-form tests for the analytic primitives
//! - [`bezier`] - rational Bezier patch sets intersected by subdivision
//! - [`Viewable`] / [`Shape`] - the uniform interface over all of them
//! - [`Solid`] / [`SolidList`] - shapes with materials, and the scene query
//!
//! # Example
//!
//! ```
//! use gray_kernel_math::{Point3, Vec3};
//! use gray_kernel_raytrace::intersect::Sphere;
//! use gray_kernel_raytrace::{FaceMaterials, MaterialId, Ray, Solid};
//!
//! let crystal = Solid::new(
//!     Sphere::new(Point3::origin(), 1.0),
//!     FaceMaterials::new(MaterialId(0), MaterialId(1)),
//! );
//! let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
//! let (t, hit) = crystal.find_intersection(&ray, 100.0).unwrap().unwrap();
//! assert!((t - 4.0).abs() < 1e-12);
//! assert!(hit.is_front_face());
//! ```

mod ray;
pub mod bezier;
pub mod config;
pub mod error;
pub mod hit;
pub mod intersect;
pub mod material;
mod solid;
mod viewable;

pub use bezier::{BezierScratch, BezierSet};
pub use config::{BezierConfig, KernelConfig};
pub use error::{ConfigError, IntersectError};
pub use hit::{Face, SurfaceHit, VisiblePoint};
pub use material::{DetectorId, FaceMaterials, MaterialId, MaterialLookup};
pub use ray::Ray;
pub use solid::{SceneHit, Solid, SolidList};
pub use viewable::{Shape, Viewable};
