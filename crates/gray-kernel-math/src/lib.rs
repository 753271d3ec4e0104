#![warn(missing_docs)]

//! Math types for the Gray ray/primitive intersection kernel.
//!
//! Thin wrappers around nalgebra providing the types the intersection
//! kernel works in: points, vectors, directions, homogeneous control
//! points, rigid placements, axis-aligned boxes, polygon clipping and
//! real polynomial root solvers.

pub mod aabb;
pub mod clip;
pub mod roots;

pub use aabb::Aabb3;

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A homogeneous point `(x, y, z, w)` used for rational control points.
///
/// The represented Euclidean point is `(x/w, y/w, z/w)`; `w == 0` is a
/// point at infinity.
pub type HPoint = Vector4<f64>;

/// Build a homogeneous point from a Euclidean point and a weight.
///
/// The coordinates are premultiplied, so the point projects back to `p`.
pub fn hpoint(p: &Point3, w: f64) -> HPoint {
    HPoint::new(p.x * w, p.y * w, p.z * w, w)
}

/// Project a homogeneous point back to Euclidean space.
pub fn project(h: &HPoint) -> Point3 {
    Point3::new(h.x / h.w, h.y / h.w, h.z / h.w)
}

/// A rigid placement: rotation followed by translation.
///
/// Used once at scene-build time to move solids into world space, never
/// inside the ray loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// The underlying isometry.
    pub isometry: Isometry3<f64>,
}

impl RigidTransform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            isometry: Isometry3::from_parts(
                Translation3::new(dx, dy, dz),
                UnitQuaternion::identity(),
            ),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::x_axis(), angle)
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::y_axis(), angle)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::z_axis(), angle)
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        Self {
            isometry: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(axis, angle),
            ),
        }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The result applies `other` first, then `self`.
    pub fn then(&self, other: &RigidTransform) -> Self {
        Self {
            isometry: self.isometry * other.isometry,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.isometry.transform_point(p)
    }

    /// Transform a direction vector (rotation only).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.isometry.transform_vector(v)
    }

    /// Transform a homogeneous point, keeping its weight.
    ///
    /// Points at infinity (`w == 0`) are only rotated.
    pub fn apply_hpoint(&self, h: &HPoint) -> HPoint {
        let xyz = self.isometry.rotation * h.xyz() + self.isometry.translation.vector * h.w;
        HPoint::new(xyz.x, xyz.y, xyz.z, h.w)
    }

    /// Inverse of this transform. Rigid transforms always invert.
    pub fn inverse(&self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Complete a unit axis to a right-handed orthonormal frame.
///
/// Returns `(a, b)` with `a × b == axis`. `axis` must be non-zero; it is
/// normalized before use.
pub fn ortho_basis(axis: &Vec3) -> (Vec3, Vec3) {
    let n = axis.normalize();
    // Cross with the world axis least aligned with n.
    let helper = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vec3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let a = helper.cross(&n).normalize();
    let b = n.cross(&a);
    (a, b)
}
