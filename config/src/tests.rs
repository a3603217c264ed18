//! # Tests for Kernel Configuration
//!
//! Unit tests verifying the default snapshot and validation rules.

use crate::constants::*;
use crate::settings::*;

// =============================================================================
// DEFAULT SNAPSHOT TESTS
// =============================================================================

#[test]
fn test_default_matches_constants() {
    let cfg = KernelConfig::default();
    assert_eq!(cfg.containment_epsilon, CONTAINMENT_EPSILON);
    assert_eq!(cfg.solver_tolerance, SOLVER_TOLERANCE);
    assert_eq!(cfg.solver_max_iterations, SOLVER_MAX_ITERATIONS);
    assert_eq!(cfg.bvh_max_leaf_triangles, BVH_MAX_LEAF_TRIANGLES);
    assert_eq!(cfg.bvh_max_depth, BVH_MAX_DEPTH);
    assert_eq!(cfg.hole_segments, HOLE_SEGMENTS);
}

#[test]
fn test_default_uv_is_patch_center() {
    assert_eq!(DEFAULT_UV, [0.5, 0.5]);
}

// =============================================================================
// VALIDATION TESTS
// =============================================================================

#[test]
fn test_new_rejects_non_positive_solver_tolerance() {
    assert_eq!(
        KernelConfig::new(1e-6, 0.0, 10, 4, 10, 64).unwrap_err(),
        ConfigError::InvalidTolerance(0.0)
    );
}

#[test]
fn test_new_rejects_nan_containment() {
    let err = KernelConfig::new(f64::NAN, 1e-10, 10, 4, 10, 64).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTolerance(v) if v.is_nan()));
}

#[test]
fn test_new_allows_exact_containment() {
    let cfg = KernelConfig::new(0.0, 1e-10, 10, 4, 10, 64).unwrap();
    assert_eq!(cfg.containment_epsilon, 0.0);
}

#[test]
fn test_new_rejects_zero_iterations() {
    assert_eq!(
        KernelConfig::new(1e-6, 1e-10, 0, 4, 10, 64).unwrap_err(),
        ConfigError::InvalidIterationCap(0)
    );
}

#[test]
fn test_new_rejects_empty_leaves() {
    assert_eq!(
        KernelConfig::new(1e-6, 1e-10, 10, 0, 10, 64).unwrap_err(),
        ConfigError::InvalidLeafSize(0)
    );
}

#[test]
fn test_new_rejects_two_segment_circle() {
    let err = KernelConfig::new(1e-6, 1e-10, 10, 4, 10, 2).unwrap_err();
    assert_eq!(err, ConfigError::InvalidSegments(2));
    assert!(err.to_string().contains(">= 3"));
}
