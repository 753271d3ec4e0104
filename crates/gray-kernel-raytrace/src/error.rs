//! Error types for intersection queries and kernel configuration.

use thiserror::Error;

/// Errors raised by the Bezier subdivision engine.
///
/// Analytic primitives never fail: a degenerate configuration is simply a
/// miss.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntersectError {
    /// The candidate stack of a query ran out of room.
    #[error("Bezier candidate stack overflow (capacity {capacity})")]
    CandidateStackOverflow {
        /// Configured number of candidate slots.
        capacity: usize,
    },

    /// An input patch never reached a usable bounding parallelepiped.
    #[error("Bezier patch still not subdivided enough after {rounds} rounds")]
    PatchNotConverging {
        /// Subdivision rounds performed.
        rounds: u32,
    },

    /// Only quadratic (order 3) and cubic (order 4) patches are supported.
    #[error("Unsupported Bezier patch order {u_order}x{v_order}")]
    UnsupportedPatchOrder {
        /// Order in the u direction.
        u_order: usize,
        /// Order in the v direction.
        v_order: usize,
    },

    /// The control point array does not match the patch orders.
    #[error("Expected {expected} control points, got {got}")]
    ControlPointCount {
        /// `u_order * v_order`.
        expected: usize,
        /// Length of the supplied array.
        got: usize,
    },
}

/// Errors from loading a [`KernelConfig`](crate::KernelConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML parse or schema error.
    #[error("Invalid kernel configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is outside its usable range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
