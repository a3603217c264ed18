//! # Region Extrusion
//!
//! Lifts a region off the surface as a solid: every region vertex gets a
//! displaced copy, the region faces are re-emitted on the copies as a cap
//! and each boundary edge is bridged to its copy by two side-wall
//! triangles. The base vertices stay behind as the bottom rim.
//!
//! A non-zero taper scales the cap about the region centroid, in the plane
//! orthogonal to the region normal, so the side walls lean by the taper
//! angle on average.

use super::executor::{EditSummary, SkipReason};
use super::ExtrudeParams;
use crate::mesh::{Face, Mesh, VertexId, TAG_EXTRUDE_TOP};
use crate::region::Region;
use crate::topology::{extract_region_boundary_loops, OrientationSpace};
use config::constants::{near_zero, NORMAL_EPSILON, RADIUS_EPSILON, VERTICAL_NORMAL_THRESHOLD};
use glam::DVec3;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Extrudes `region` by `params.height_mm` along the resolved direction.
///
/// A region without boundary loops (a closed surface) yields a cap only.
pub(crate) fn extrude_region(
    mesh: &mut Mesh,
    region: &Region,
    params: &ExtrudeParams,
) -> Result<EditSummary, SkipReason> {
    let height = params.height_mm;
    let taper = params.taper_angle_degrees;
    if !height.is_finite() || !taper.is_finite() {
        return Err(SkipReason::unsupported_params(format!(
            "height {height} mm, taper {taper} degrees"
        )));
    }

    let base = region.face_vertices(mesh);
    if base.is_empty() {
        return Err(SkipReason::EmptyRegion);
    }

    let normal = average_normal(mesh, region);
    let direction = params.direction.resolve(normal);
    let frame = TangentFrame::new(normal);
    let centroid = base
        .iter()
        .filter_map(|&v| mesh.position(v))
        .sum::<DVec3>()
        / base.len() as f64;

    let mean_radius = base
        .iter()
        .filter_map(|&v| mesh.position(v))
        .map(|p| frame.in_plane(p - centroid).length())
        .sum::<f64>()
        / base.len() as f64;
    let scale = if mean_radius > RADIUS_EPSILON {
        1.0 + height * taper.to_radians().tan() / mean_radius
    } else {
        1.0
    };
    debug!(
        "Extruding {} vertices by {} mm along ({:.3}, {:.3}, {:.3}), top scale {:.4}",
        base.len(),
        height,
        direction.x,
        direction.y,
        direction.z,
        scale
    );

    // Displaced copies
    let mut top: HashMap<VertexId, VertexId> = HashMap::with_capacity(base.len());
    for &v in &base {
        let Some(vertex) = mesh.vertex(v) else {
            continue;
        };
        let (uv, offset) = (vertex.uv, vertex.position - centroid);
        let position = centroid
            + frame.in_plane(offset) * scale
            + normal * offset.dot(normal)
            + direction * height;
        top.insert(v, mesh.add_tagged_vertex(uv, position, TAG_EXTRUDE_TOP));
    }
    let lift = |v: VertexId| top.get(&v).copied().unwrap_or(v);

    let mut new_faces: Vec<Face> = region
        .faces
        .iter()
        .filter_map(|&i| mesh.faces().get(i))
        .map(|face| face.remapped(lift))
        .collect();

    // Walls follow each boundary edge in the direction its region face
    // traverses it, whatever the loop orientation in UV.
    let directed: HashSet<(VertexId, VertexId)> = region
        .faces
        .iter()
        .filter_map(|&i| mesh.faces().get(i))
        .flat_map(|face| face.edges())
        .collect();
    let loops = extract_region_boundary_loops(mesh, &region.faces, OrientationSpace::Uv);
    for boundary in &loops {
        for (a, b) in boundary.edges() {
            let (a, b) = if directed.contains(&(a, b)) { (a, b) } else { (b, a) };
            new_faces.push(Face::triangle(a, b, lift(b)));
            new_faces.push(Face::triangle(a, lift(b), lift(a)));
        }
    }

    let summary = EditSummary {
        removed_faces: region.faces.len(),
        added_faces: new_faces.len(),
        added_vertices: top.len(),
    };
    mesh.replace_faces(&region.faces, new_faces);
    Ok(summary)
}

/// Normalized sum of fan-triangle cross products; +Z when it vanishes.
pub(crate) fn average_normal(mesh: &Mesh, region: &Region) -> DVec3 {
    let sum: DVec3 = region
        .triangles
        .iter()
        .filter_map(|&[a, b, c]| {
            let (a, b, c) = (mesh.position(a)?, mesh.position(b)?, mesh.position(c)?);
            Some((b - a).cross(c - a))
        })
        .sum();
    if near_zero(sum.length(), NORMAL_EPSILON) {
        DVec3::Z
    } else {
        sum.normalize()
    }
}

/// Orthonormal `(t, b, n)` frame around a unit normal.
struct TangentFrame {
    tangent: DVec3,
    bitangent: DVec3,
}

impl TangentFrame {
    fn new(normal: DVec3) -> Self {
        // Near-vertical normals are seeded from X, everything else from Z.
        let seed = if normal.z.abs() > VERTICAL_NORMAL_THRESHOLD {
            DVec3::X
        } else {
            DVec3::Z
        };
        let tangent = (seed - normal * seed.dot(normal)).normalize();
        let bitangent = normal.cross(tangent);
        Self { tangent, bitangent }
    }

    /// Component of `offset` in the tangent plane.
    fn in_plane(&self, offset: DVec3) -> DVec3 {
        self.tangent * offset.dot(self.tangent) + self.bitangent * offset.dot(self.bitangent)
    }
}
