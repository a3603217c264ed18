//! Boundary loop extraction.
//!
//! Boundary loops are recomputed from topology every time they are needed;
//! loop metadata supplied by callers is never trusted.

use super::adjacency::{edge_key, EdgeKey};
use crate::geometry::signed_area;
use crate::mesh::{Face, Mesh, VertexId};
use glam::DVec2;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Plane in which loop orientation is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationSpace {
    /// World x/y projection. Independent of the current UV, used before a
    /// parametrization exists.
    Xy,
    /// Parametric (u,v) coordinates.
    Uv,
}

/// A closed, non-repeating, counter-clockwise vertex cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    vertices: Vec<VertexId>,
    perimeter: f64,
}

impl BoundaryLoop {
    /// Vertices in counter-clockwise order. The closing edge is implicit.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of vertices (equal to the number of edges).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the loop has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// World-space perimeter.
    #[inline]
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Directed edges in loop order, wrapping last→first.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// The loop as a UV polygon.
    pub fn uv_polygon(&self, mesh: &Mesh) -> Vec<DVec2> {
        self.vertices
            .iter()
            .map(|&v| project(mesh, v, OrientationSpace::Uv))
            .collect()
    }
}

/// Extracts the boundary loops of a whole mesh, outer boundary first.
///
/// A closed mesh yields an empty list.
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh};
/// use patch_kernel::topology::{extract_boundary_loops, OrientationSpace};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("quad");
/// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
///     mesh.add_vertex(DVec2::from_array(p), DVec3::new(p[0], p[1], 0.0));
/// }
/// mesh.add_face(Face::from_raw([0, 1, 2]));
/// mesh.add_face(Face::from_raw([0, 2, 3]));
///
/// let loops = extract_boundary_loops(&mesh, OrientationSpace::Xy);
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].len(), 4);
/// ```
pub fn extract_boundary_loops(mesh: &Mesh, space: OrientationSpace) -> Vec<BoundaryLoop> {
    extract_from_faces(mesh, mesh.faces().iter(), space)
}

/// Extracts the boundary loops of the sub-patch formed by `face_indices`.
///
/// Out-of-range indices are ignored.
pub fn extract_region_boundary_loops(
    mesh: &Mesh,
    face_indices: &[usize],
    space: OrientationSpace,
) -> Vec<BoundaryLoop> {
    let faces = face_indices.iter().filter_map(|&i| mesh.faces().get(i));
    extract_from_faces(mesh, faces, space)
}

fn extract_from_faces<'a>(
    mesh: &Mesh,
    faces: impl Iterator<Item = &'a Face>,
    space: OrientationSpace,
) -> Vec<BoundaryLoop> {
    let boundary_edges = boundary_edges_in_order(faces);
    if boundary_edges.is_empty() {
        return Vec::new();
    }
    debug!("Found {} boundary edges", boundary_edges.len());

    // Neighbour lists keep first-seen order; that order is the tie-break at
    // non-manifold branch points.
    let mut graph: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for &(a, b) in &boundary_edges {
        graph.entry(a).or_default().push(b);
        graph.entry(b).or_default().push(a);
    }

    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut loops = Vec::new();

    for &(start, _) in &boundary_edges {
        if visited.contains(&start) {
            continue;
        }

        let mut walk = Vec::new();
        let mut current = start;
        let closed = loop {
            visited.insert(current);
            walk.push(current);

            let neighbors = graph.get(&current).map_or(&[][..], Vec::as_slice);
            match neighbors.iter().copied().find(|n| !visited.contains(n)) {
                Some(next) => current = next,
                None => break walk.len() > 2 && neighbors.contains(&start),
            }
        };

        if walk.len() < 3 {
            continue;
        }
        if !closed {
            warn!("Boundary walk starting at vertex {} is not closed", start);
        }

        if signed_area(&projected(mesh, &walk, space)) < 0.0 {
            walk.reverse();
        }
        let perimeter = perimeter_3d(mesh, &walk);
        loops.push(BoundaryLoop {
            vertices: walk,
            perimeter,
        });
    }

    loops.sort_by(|a, b| b.perimeter.total_cmp(&a.perimeter));
    debug!(
        "Extracted {} boundary loops, sizes: {:?}",
        loops.len(),
        loops.iter().map(BoundaryLoop::len).collect::<Vec<_>>()
    );
    loops
}

/// Undirected edges used by exactly one face, in first-seen order.
fn boundary_edges_in_order<'a>(faces: impl Iterator<Item = &'a Face>) -> Vec<EdgeKey> {
    let mut uses: HashMap<EdgeKey, usize> = HashMap::new();
    let mut order = Vec::new();
    for face in faces {
        for (a, b) in face.edges() {
            if a == b {
                continue;
            }
            let count = uses.entry(edge_key(a, b)).or_insert_with(|| {
                order.push(edge_key(a, b));
                0
            });
            *count += 1;
        }
    }
    order.retain(|key| uses.get(key) == Some(&1));
    order
}

fn project(mesh: &Mesh, v: VertexId, space: OrientationSpace) -> DVec2 {
    match (space, mesh.vertex(v)) {
        (OrientationSpace::Xy, Some(vertex)) => vertex.position.truncate(),
        (OrientationSpace::Uv, Some(vertex)) => vertex.uv_or_default(),
        (_, None) => DVec2::ZERO,
    }
}

fn projected(mesh: &Mesh, walk: &[VertexId], space: OrientationSpace) -> Vec<DVec2> {
    walk.iter().map(|&v| project(mesh, v, space)).collect()
}

fn perimeter_3d(mesh: &Mesh, walk: &[VertexId]) -> f64 {
    let n = walk.len();
    (0..n)
        .filter_map(|i| {
            let a = mesh.position(walk[i])?;
            let b = mesh.position(walk[(i + 1) % n])?;
            Some(a.distance(b))
        })
        .sum()
}
