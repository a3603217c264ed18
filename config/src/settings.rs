//! Validated configuration snapshot shared by the kernel entry points.
//!
//! Each field defaults to its constant in [`crate::constants`]; callers that
//! need different tolerances build a snapshot with [`KernelConfig::new`],
//! which rejects values the algorithms cannot work with.

use crate::constants::{
    BVH_MAX_DEPTH, BVH_MAX_LEAF_TRIANGLES, CONTAINMENT_EPSILON, HOLE_SEGMENTS, MIN_HOLE_SEGMENTS,
    SOLVER_MAX_ITERATIONS, SOLVER_TOLERANCE,
};
use std::fmt;

/// Immutable snapshot of the tunable kernel parameters.
///
/// # Examples
/// ```
/// use config::settings::KernelConfig;
/// let config = KernelConfig::default();
/// assert!(config.containment_epsilon > 0.0);
/// assert_eq!(config.hole_segments, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelConfig {
    /// Slack for point-in-triangle and point-in-box tests.
    pub containment_epsilon: f64,
    /// Residual norm at which conjugate gradient stops.
    pub solver_tolerance: f64,
    /// Conjugate-gradient iteration cap per solve.
    pub solver_max_iterations: usize,
    /// Maximum triangles per BVH leaf.
    pub bvh_max_leaf_triangles: usize,
    /// Maximum BVH depth.
    pub bvh_max_depth: usize,
    /// Segments used to approximate circular holes.
    pub hole_segments: usize,
}

impl KernelConfig {
    /// Builds a configuration, validating every field.
    ///
    /// # Examples
    /// ```
    /// use config::settings::KernelConfig;
    /// let cfg = KernelConfig::new(1.0e-6, 1.0e-8, 500, 4, 8, 32).expect("valid config");
    /// assert_eq!(cfg.solver_max_iterations, 500);
    /// assert!(KernelConfig::new(1.0e-6, 0.0, 500, 4, 8, 32).is_err());
    /// ```
    pub fn new(
        containment_epsilon: f64,
        solver_tolerance: f64,
        solver_max_iterations: usize,
        bvh_max_leaf_triangles: usize,
        bvh_max_depth: usize,
        hole_segments: usize,
    ) -> Result<Self, ConfigError> {
        if !(containment_epsilon >= 0.0) {
            return Err(ConfigError::InvalidTolerance(containment_epsilon));
        }
        if !(solver_tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(solver_tolerance));
        }
        if solver_max_iterations == 0 {
            return Err(ConfigError::InvalidIterationCap(solver_max_iterations));
        }
        if bvh_max_leaf_triangles == 0 {
            return Err(ConfigError::InvalidLeafSize(bvh_max_leaf_triangles));
        }
        if hole_segments < MIN_HOLE_SEGMENTS {
            return Err(ConfigError::InvalidSegments(hole_segments));
        }
        Ok(Self {
            containment_epsilon,
            solver_tolerance,
            solver_max_iterations,
            bvh_max_leaf_triangles,
            bvh_max_depth,
            hole_segments,
        })
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            containment_epsilon: CONTAINMENT_EPSILON,
            solver_tolerance: SOLVER_TOLERANCE,
            solver_max_iterations: SOLVER_MAX_ITERATIONS,
            bvh_max_leaf_triangles: BVH_MAX_LEAF_TRIANGLES,
            bvh_max_depth: BVH_MAX_DEPTH,
            hole_segments: HOLE_SEGMENTS,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised when a tolerance is negative, zero where it must be positive, or NaN.
    InvalidTolerance(f64),
    /// Raised when the solver would be allowed no iterations.
    InvalidIterationCap(usize),
    /// Raised when BVH leaves could hold no triangles.
    InvalidLeafSize(usize),
    /// Raised when the hole polygon would have fewer than three sides.
    InvalidSegments(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be a positive number: {value}")
            }
            ConfigError::InvalidIterationCap(value) => {
                write!(f, "solver_max_iterations must be >= 1: {value}")
            }
            ConfigError::InvalidLeafSize(value) => {
                write!(f, "bvh_max_leaf_triangles must be >= 1: {value}")
            }
            ConfigError::InvalidSegments(value) => {
                write!(f, "hole_segments must be >= {MIN_HOLE_SEGMENTS}: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
