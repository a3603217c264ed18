//! # UV Spatial Index
//!
//! Point location in parametric space and the UV→XYZ lift. A [`Bvh`] answers
//! "which fan triangles contain this (u,v)?"; the lift then interpolates the
//! containing triangle's world corners barycentrically.
//!
//! Editors that work on a small region skip the tree and lift over an
//! explicit triangle list with [`lift_over_triangles`].

mod bvh;

#[cfg(test)]
mod tests;

pub use bvh::{Bvh, BvhNode};

use crate::geometry::{barycentric, point_in_triangle, UvBox};
use crate::mesh::{Mesh, VertexId};
use glam::{DVec2, DVec3};

/// A fan triangle of a mesh face, with UV and world corners.
#[derive(Debug, Clone, PartialEq)]
pub struct UvTriangle {
    /// Index of the face the triangle came from
    pub face: usize,
    /// Corner vertex ids
    pub vertices: [VertexId; 3],
    /// Corner UVs
    pub uv: [DVec2; 3],
    /// Corner world positions
    pub xyz: [DVec3; 3],
    /// UV bounds
    pub bounds: UvBox,
}

impl UvTriangle {
    /// Resolves a fan triangle against the mesh. `None` if any corner is
    /// unknown or has a non-finite UV.
    pub fn from_mesh(mesh: &Mesh, face: usize, vertices: [VertexId; 3]) -> Option<Self> {
        let [a, b, c] = vertices;
        let uv = [mesh.uv(a)?, mesh.uv(b)?, mesh.uv(c)?];
        let xyz = [mesh.position(a)?, mesh.position(b)?, mesh.position(c)?];
        Some(Self {
            face,
            vertices,
            uv,
            xyz,
            bounds: UvBox::from_points(uv),
        })
    }

    /// Returns true if `p` lies inside the triangle, with slack `eps`.
    #[inline]
    pub fn contains(&self, p: DVec2, eps: f64) -> bool {
        let [a, b, c] = self.uv;
        point_in_triangle(p, a, b, c, eps)
    }

    /// Interpolates the world corners at `p`. `None` for a degenerate
    /// triangle; points outside are extrapolated.
    pub fn lift(&self, p: DVec2) -> Option<DVec3> {
        let [a, b, c] = self.uv;
        let w = barycentric(p, a, b, c)?;
        Some(self.xyz[0] * w.x + self.xyz[1] * w.y + self.xyz[2] * w.z)
    }

    /// Closest point of the triangle (edges included) to `p`.
    pub fn closest_point(&self, p: DVec2) -> DVec2 {
        if self.contains(p, 0.0) {
            return p;
        }
        let [a, b, c] = self.uv;
        [(a, b), (b, c), (c, a)]
            .into_iter()
            .map(|(s, e)| closest_on_segment(p, s, e))
            .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
            .unwrap_or(a)
    }
}

/// Collects the fan triangles of `faces` that have ≥3 corners and known UV.
pub fn collect_uv_triangles(mesh: &Mesh, faces: impl IntoIterator<Item = usize>) -> Vec<UvTriangle> {
    faces
        .into_iter()
        .filter_map(|index| mesh.faces().get(index).map(|face| (index, face)))
        .flat_map(|(index, face)| {
            face.fan_triangles()
                .filter_map(move |tri| UvTriangle::from_mesh(mesh, index, tri))
        })
        .collect()
}

/// Lifts a UV point over an explicit triangle list.
///
/// Uses the first triangle containing `p` (slack `eps`). When none does, the
/// point is snapped onto the nearest triangle and lifted there. `None` only
/// when no usable triangle exists.
pub fn lift_over_triangles(triangles: &[UvTriangle], p: DVec2, eps: f64) -> Option<DVec3> {
    if let Some(hit) = triangles
        .iter()
        .filter(|t| t.contains(p, eps))
        .find_map(|t| t.lift(p))
    {
        return Some(hit);
    }

    triangles
        .iter()
        .filter_map(|t| {
            let q = t.closest_point(p);
            Some((q.distance_squared(p), t.lift(q)?))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, xyz)| xyz)
}

fn closest_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}
