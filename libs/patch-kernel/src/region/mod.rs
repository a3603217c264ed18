//! # Region Selection
//!
//! Resolves a UV box against a mesh into the set of vertices and faces an
//! operation works on.

mod sat;

#[cfg(test)]
mod tests;

pub use sat::triangle_intersects_box;

use crate::geometry::UvBox;
use crate::mesh::{Face, Mesh, VertexId};
use crate::spatial::{collect_uv_triangles, UvTriangle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// How faces straddling the box edge are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// A face is selected only when every corner lies in the box.
    /// Used by the executor.
    #[default]
    FullContainment,
    /// A face is selected when it touches the box at all.
    ///
    /// Every fan triangle of the face is tested (a corner inside the box,
    /// then a separating-axis test), not only the first one, so a polygon
    /// whose later triangles reach into the box is selected too. For
    /// triangle meshes the two readings agree.
    PartialOverlap,
}

/// Vertices and faces selected by a UV box.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Selected vertices
    #[serde(rename = "vertexIds")]
    pub vertices: BTreeSet<VertexId>,
    /// Indices of selected faces, ascending
    #[serde(rename = "faceIndices")]
    pub faces: Vec<usize>,
    /// Fan triangulation of the selected faces
    pub triangles: Vec<[VertexId; 3]>,
}

impl Region {
    /// Returns true if no face was selected.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of selected faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Vertices used by the selected faces, in first-use order.
    pub fn face_vertices(&self, mesh: &Mesh) -> Vec<VertexId> {
        let mut seen = BTreeSet::new();
        self.faces
            .iter()
            .filter_map(|&i| mesh.faces().get(i))
            .flat_map(Face::vertices)
            .copied()
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// UV triangles of the selected faces.
    pub fn uv_triangles(&self, mesh: &Mesh) -> Vec<UvTriangle> {
        collect_uv_triangles(mesh, self.faces.iter().copied())
    }
}

/// Selects the part of `mesh` covered by `bounds`.
///
/// Box tests are inclusive with slack `eps`. An inverted box selects
/// nothing.
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh};
/// use patch_kernel::geometry::UvBox;
/// use patch_kernel::region::{select_uv_region, SelectionPolicy};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("quad");
/// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
///     mesh.add_vertex(DVec2::from_array(p), DVec3::new(p[0], p[1], 0.0));
/// }
/// mesh.add_face(Face::from_raw([0, 1, 2]));
/// mesh.add_face(Face::from_raw([0, 2, 3]));
///
/// let all = select_uv_region(&mesh, &UvBox::unit(), SelectionPolicy::FullContainment, 1e-6);
/// assert_eq!(all.faces, vec![0, 1]);
///
/// let corner = UvBox::new(0.9, 1.0, 0.0, 0.1);
/// let touching = select_uv_region(&mesh, &corner, SelectionPolicy::PartialOverlap, 1e-6);
/// assert_eq!(touching.faces, vec![0]);
/// ```
pub fn select_uv_region(mesh: &Mesh, bounds: &UvBox, policy: SelectionPolicy, eps: f64) -> Region {
    let inside = |v: VertexId| mesh.uv(v).is_some_and(|uv| bounds.contains(uv, eps));

    let mut region = Region::default();
    if !bounds.is_valid() {
        debug!("Inverted UV box {:?} selects nothing", bounds);
        return region;
    }

    if policy == SelectionPolicy::FullContainment {
        region.vertices = mesh
            .vertices()
            .iter()
            .map(|v| v.id)
            .filter(|&v| inside(v))
            .collect();
    }

    for (index, face) in mesh.faces().iter().enumerate() {
        if face.len() < 3 {
            continue;
        }
        let selected = match policy {
            SelectionPolicy::FullContainment => face.vertices().iter().all(|&v| inside(v)),
            SelectionPolicy::PartialOverlap => {
                face.vertices().iter().all(|&v| inside(v))
                    || face.fan_triangles().any(|tri| touches(mesh, tri, bounds, eps, &inside))
            }
        };
        if !selected {
            continue;
        }

        region.faces.push(index);
        region.triangles.extend(face.fan_triangles());
        if policy == SelectionPolicy::PartialOverlap {
            region.vertices.extend(face.vertices().iter().copied());
        }
    }

    debug!(
        "Selected {} vertices and {} faces in [{}, {}]x[{}, {}] ({:?})",
        region.vertices.len(),
        region.faces.len(),
        bounds.u_min,
        bounds.u_max,
        bounds.v_min,
        bounds.v_max,
        policy
    );
    region
}

fn touches(
    mesh: &Mesh,
    triangle: [VertexId; 3],
    bounds: &UvBox,
    eps: f64,
    inside: &impl Fn(VertexId) -> bool,
) -> bool {
    if triangle.iter().any(|&v| inside(v)) {
        return true;
    }
    let [a, b, c] = triangle;
    match (mesh.uv(a), mesh.uv(b), mesh.uv(c)) {
        (Some(a), Some(b), Some(c)) => triangle_intersects_box([a, b, c], bounds, eps),
        _ => false,
    }
}
