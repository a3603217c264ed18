//! Separating axis test between a UV triangle and a UV box.

use crate::geometry::UvBox;
use glam::DVec2;

/// Returns true if the triangle and the box overlap.
///
/// Candidate axes are the two box axes and the three triangle edge normals;
/// the shapes are disjoint iff their projections are separated on one of
/// them by more than `eps`.
///
/// # Example
///
/// ```rust
/// use patch_kernel::geometry::UvBox;
/// use patch_kernel::region::triangle_intersects_box;
/// use glam::DVec2;
///
/// let b = UvBox::new(0.4, 0.6, 0.4, 0.6);
/// let big = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
/// let far = [DVec2::new(0.9, 0.9), DVec2::new(1.0, 0.9), DVec2::new(0.9, 1.0)];
/// assert!(triangle_intersects_box(big, &b, 0.0));
/// assert!(!triangle_intersects_box(far, &b, 0.0));
/// ```
pub fn triangle_intersects_box(triangle: [DVec2; 3], bounds: &UvBox, eps: f64) -> bool {
    let corners = bounds.corners();
    let [a, b, c] = triangle;

    let axes = [
        DVec2::X,
        DVec2::Y,
        (b - a).perp(),
        (c - b).perp(),
        (a - c).perp(),
    ];

    axes.into_iter()
        .filter(|axis| axis.length_squared() > 0.0)
        .all(|axis| {
            let axis = axis.normalize();
            let (t_min, t_max) = project(&triangle, axis);
            let (b_min, b_max) = project(&corners, axis);
            t_max >= b_min - eps && b_max >= t_min - eps
        })
}

fn project(points: &[DVec2], axis: DVec2) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
}
