//! # Planar Geometry Helpers
//!
//! UV-space primitives shared by the spatial index, region selector and
//! editors: axis-aligned UV boxes, signed areas, barycentric coordinates and
//! point-in-polygon tests.

use config::constants::DEGENERATE_AREA_EPSILON;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in UV space.
///
/// Used both as an operation target (`uvBox` on the wire) and as the bounds
/// of BVH nodes.
///
/// # Example
///
/// ```rust
/// use patch_kernel::geometry::UvBox;
/// use glam::DVec2;
///
/// let b = UvBox::new(0.25, 0.75, 0.0, 1.0);
/// assert!(b.contains(DVec2::new(0.5, 0.5), 0.0));
/// assert!(!b.contains(DVec2::new(0.9, 0.5), 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvBox {
    /// Minimum u
    pub u_min: f64,
    /// Maximum u
    pub u_max: f64,
    /// Minimum v
    pub v_min: f64,
    /// Maximum v
    pub v_max: f64,
}

impl UvBox {
    /// Creates a box from its extents.
    pub const fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// The whole parametric domain, [0,1]².
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }

    /// An inverted box that any `expand` call replaces.
    pub const fn empty() -> Self {
        Self::new(f64::MAX, f64::MIN, f64::MAX, f64::MIN)
    }

    /// Smallest box containing all points.
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// Grows the box to include a point.
    pub fn expand(&mut self, p: DVec2) {
        self.u_min = self.u_min.min(p.x);
        self.u_max = self.u_max.max(p.x);
        self.v_min = self.v_min.min(p.y);
        self.v_max = self.v_max.max(p.y);
    }

    /// Grows the box to include another box.
    pub fn union(&mut self, other: &Self) {
        self.u_min = self.u_min.min(other.u_min);
        self.u_max = self.u_max.max(other.u_max);
        self.v_min = self.v_min.min(other.v_min);
        self.v_max = self.v_max.max(other.v_max);
    }

    /// Returns true if min ≤ max on both axes.
    pub fn is_valid(&self) -> bool {
        self.u_min <= self.u_max && self.v_min <= self.v_max
    }

    /// Inclusive containment test with slack `eps` on every side.
    #[inline]
    pub fn contains(&self, p: DVec2, eps: f64) -> bool {
        p.x >= self.u_min - eps
            && p.x <= self.u_max + eps
            && p.y >= self.v_min - eps
            && p.y <= self.v_max + eps
    }

    /// Box centre.
    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.u_min + self.u_max) * 0.5,
            (self.v_min + self.v_max) * 0.5,
        )
    }

    /// Width and height.
    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.u_max - self.u_min, self.v_max - self.v_min)
    }

    /// Axis of greatest extent: 0 for u, 1 for v (ties pick u).
    pub fn longest_axis(&self) -> usize {
        let extent = self.extent();
        if extent.x >= extent.y {
            0
        } else {
            1
        }
    }

    /// The four corners, counter-clockwise from (u_min, v_min).
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.u_min, self.v_min),
            DVec2::new(self.u_max, self.v_min),
            DVec2::new(self.u_max, self.v_max),
            DVec2::new(self.u_min, self.v_max),
        ]
    }
}

/// Signed area of a closed polygon (positive when counter-clockwise).
pub fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += a.perp_dot(b);
    }
    twice_area * 0.5
}

/// Signed area of a triangle (positive when counter-clockwise).
#[inline]
pub fn triangle_signed_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a)
}

/// Barycentric weights of `p` with respect to triangle `abc`.
///
/// Returns `None` for degenerate triangles.
///
/// # Example
///
/// ```rust
/// use patch_kernel::geometry::barycentric;
/// use glam::DVec2;
///
/// let w = barycentric(
///     DVec2::new(0.25, 0.25),
///     DVec2::ZERO,
///     DVec2::X,
///     DVec2::Y,
/// ).unwrap();
/// assert!((w.x - 0.5).abs() < 1e-12);
/// assert!((w.y - 0.25).abs() < 1e-12);
/// ```
pub fn barycentric(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> Option<DVec3> {
    let ab = b - a;
    let ac = c - a;
    let denom = ab.perp_dot(ac);
    if denom.abs() < DEGENERATE_AREA_EPSILON {
        return None;
    }
    let ap = p - a;
    let s = ap.perp_dot(ac) / denom;
    let t = ab.perp_dot(ap) / denom;
    Some(DVec3::new(1.0 - s - t, s, t))
}

/// Point-in-triangle test with slack `eps` on each barycentric weight.
///
/// Works for either winding; degenerate triangles contain nothing.
#[inline]
pub fn point_in_triangle(p: DVec2, a: DVec2, b: DVec2, c: DVec2, eps: f64) -> bool {
    barycentric(p, a, b, c).is_some_and(|w| w.x >= -eps && w.y >= -eps && w.z >= -eps)
}

/// Even-odd ray-crossing test of `p` against a closed polygon.
pub fn point_in_polygon(p: DVec2, polygon: &[DVec2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
