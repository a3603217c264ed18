//! # Configuration Constants
//!
//! Centralized constants for the patch-editing kernel. All containment,
//! convergence and degeneracy tolerances are defined here.
//!
//! ## Categories
//!
//! - **Containment**: point-in-triangle and point-in-box slack
//! - **Solver**: conjugate-gradient convergence and iteration caps
//! - **Degeneracy**: near-zero areas, normals and radii
//! - **Spatial Index**: BVH leaf size and depth limits
//! - **Tessellation**: polygon approximation of circular cuts
//! - **Interchange**: schema version and derived-mesh naming

// =============================================================================
// CONTAINMENT CONSTANTS
// =============================================================================

/// Slack applied when testing whether a UV point lies inside a triangle or
/// a UV box.
///
/// Points on shared edges land in both neighbouring triangles, which is what
/// the BVH query expects.
///
/// # Example
///
/// ```rust
/// use config::constants::CONTAINMENT_EPSILON;
///
/// let barycentric_weight = -5e-7;
/// assert!(barycentric_weight >= -CONTAINMENT_EPSILON);
/// ```
pub const CONTAINMENT_EPSILON: f64 = 1e-6;

/// Distance in UV space under which a polygon vertex produced by the hole
/// boolean is considered the same point as an existing region vertex.
///
/// # Example
///
/// ```rust
/// use config::constants::{CONTAINMENT_EPSILON, UV_WELD_EPSILON};
///
/// assert!(UV_WELD_EPSILON < CONTAINMENT_EPSILON);
/// ```
pub const UV_WELD_EPSILON: f64 = 1e-7;

// =============================================================================
// SOLVER CONSTANTS
// =============================================================================

/// Residual-norm tolerance at which the conjugate-gradient solve stops.
///
/// # Example
///
/// ```rust
/// use config::constants::SOLVER_TOLERANCE;
///
/// let residual_norm = 3e-11;
/// assert!(residual_norm < SOLVER_TOLERANCE);
/// ```
pub const SOLVER_TOLERANCE: f64 = 1e-10;

/// Hard cap on conjugate-gradient iterations per right-hand side.
///
/// Bounds the solve on pathological input; hitting the cap is reported in
/// the embedding metrics, not as an error.
///
/// # Example
///
/// ```rust
/// use config::constants::SOLVER_MAX_ITERATIONS;
///
/// assert_eq!(SOLVER_MAX_ITERATIONS, 2000);
/// ```
pub const SOLVER_MAX_ITERATIONS: usize = 2000;

// =============================================================================
// DEGENERACY CONSTANTS
// =============================================================================

/// Absolute UV triangle area below which a face counts as degenerate.
///
/// # Example
///
/// ```rust
/// use config::constants::DEGENERATE_AREA_EPSILON;
///
/// let area: f64 = 1e-16;
/// assert!(area.abs() < DEGENERATE_AREA_EPSILON);
/// ```
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-14;

/// Length under which an accumulated normal or cross product is treated as
/// zero.
pub const NORMAL_EPSILON: f64 = 1e-12;

/// Mean in-plane radius under which a taper cannot be converted into a top
/// scale factor.
pub const RADIUS_EPSILON: f64 = 1e-9;

/// Boundary perimeter under which arc-length parametrization falls back to
/// uniform angular spacing.
pub const PERIMETER_EPSILON: f64 = 1e-12;

/// Absolute z-component of a unit normal above which the tangent basis is
/// seeded from the X axis instead of the Z axis.
///
/// # Example
///
/// ```rust
/// use config::constants::VERTICAL_NORMAL_THRESHOLD;
///
/// assert!(VERTICAL_NORMAL_THRESHOLD > 0.5 && VERTICAL_NORMAL_THRESHOLD < 1.0);
/// ```
pub const VERTICAL_NORMAL_THRESHOLD: f64 = 0.9;

// =============================================================================
// SPATIAL INDEX CONSTANTS
// =============================================================================

/// Maximum number of triangles stored in a BVH leaf.
pub const BVH_MAX_LEAF_TRIANGLES: usize = 4;

/// Maximum BVH depth. Nodes at this depth become leaves regardless of size.
///
/// # Example
///
/// ```rust
/// use config::constants::{BVH_MAX_DEPTH, BVH_MAX_LEAF_TRIANGLES};
///
/// // Upper bound on the number of leaves a BVH may contain.
/// let max_leaves = 1usize << BVH_MAX_DEPTH;
/// assert!(max_leaves * BVH_MAX_LEAF_TRIANGLES > 1000);
/// ```
pub const BVH_MAX_DEPTH: usize = 10;

// =============================================================================
// TESSELLATION CONSTANTS
// =============================================================================

/// Number of segments in the regular polygon approximating a circular hole.
///
/// # Example
///
/// ```rust
/// use config::constants::HOLE_SEGMENTS;
///
/// let step = 360.0 / HOLE_SEGMENTS as f64;
/// assert_eq!(step, 5.625);
/// ```
pub const HOLE_SEGMENTS: usize = 64;

/// Smallest segment count accepted for a circular hole.
pub const MIN_HOLE_SEGMENTS: usize = 3;

// =============================================================================
// INTERCHANGE CONSTANTS
// =============================================================================

/// Highest operation-envelope schema version the kernel understands.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Suffix appended to a mesh id once an operation list has been applied.
///
/// # Example
///
/// ```rust
/// use config::constants::DERIVED_MESH_SUFFIX;
///
/// let derived = format!("enclosure-top{DERIVED_MESH_SUFFIX}");
/// assert_eq!(derived, "enclosure-top|ops");
/// ```
pub const DERIVED_MESH_SUFFIX: &str = "|ops";

/// Parametric coordinate assigned to vertices without a usable (u,v).
pub const DEFAULT_UV: [f64; 2] = [0.5, 0.5];

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if a value is zero within the given tolerance.
///
/// # Example
///
/// ```rust
/// use config::constants::{near_zero, NORMAL_EPSILON};
///
/// assert!(near_zero(1e-13, NORMAL_EPSILON));
/// assert!(!near_zero(0.1, NORMAL_EPSILON));
/// ```
#[inline]
pub fn near_zero(value: f64, tolerance: f64) -> bool {
    value.abs() < tolerance
}

#[cfg(test)]
mod tests;
