//! Tests for the centralized tolerance constants.

use super::*;

/// Ensures tolerances are ordered from loosest (containment) to tightest
/// (degeneracy) so one concern never masks another.
///
/// # Examples
/// ```
/// use config::constants::{CONTAINMENT_EPSILON, DEGENERATE_AREA_EPSILON};
/// assert!(DEGENERATE_AREA_EPSILON < CONTAINMENT_EPSILON);
/// ```
#[test]
fn tolerances_are_ordered() {
    assert!(UV_WELD_EPSILON < CONTAINMENT_EPSILON);
    assert!(SOLVER_TOLERANCE < UV_WELD_EPSILON);
    assert!(DEGENERATE_AREA_EPSILON < SOLVER_TOLERANCE);
}

#[test]
fn near_zero_respects_tolerance() {
    assert!(near_zero(0.0, NORMAL_EPSILON));
    assert!(near_zero(-1e-13, NORMAL_EPSILON));
    assert!(!near_zero(1e-11, NORMAL_EPSILON));
}
