//! Mesh adjacency data structure.
//!
//! Provides neighbour lookup for vertices and face incidence for edges.

use crate::mesh::{Face, Mesh, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical undirected edge key `(min, max)`.
pub type EdgeKey = (VertexId, VertexId);

/// Builds the canonical key for an undirected edge.
#[inline]
pub fn edge_key(a: VertexId, b: VertexId) -> EdgeKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Vertex neighbour sets and edge→face incidence for a set of faces.
///
/// An edge used by exactly one face is a boundary edge, by two an interior
/// edge. Edges shared by more than two faces are kept as-is.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyMap {
    neighbors: BTreeMap<VertexId, BTreeSet<VertexId>>,
    edge_faces: BTreeMap<EdgeKey, Vec<usize>>,
}

impl AdjacencyMap {
    /// Builds adjacency over every face of a mesh.
    ///
    /// # Example
    ///
    /// ```rust
    /// use patch_kernel::{Face, Mesh, VertexId};
    /// use patch_kernel::topology::AdjacencyMap;
    /// use glam::{DVec2, DVec3};
    ///
    /// let mut mesh = Mesh::new("quad");
    /// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
    ///     mesh.add_vertex(DVec2::from_array(p), DVec3::new(p[0], p[1], 0.0));
    /// }
    /// mesh.add_face(Face::from_raw([0, 1, 2]));
    /// mesh.add_face(Face::from_raw([0, 2, 3]));
    ///
    /// let adjacency = AdjacencyMap::build(&mesh);
    /// assert_eq!(adjacency.degree(VertexId::new(0)), 3);
    /// assert_eq!(adjacency.boundary_edges().count(), 4);
    /// ```
    pub fn build(mesh: &Mesh) -> Self {
        Self::from_faces(mesh.faces().iter().enumerate())
    }

    /// Builds adjacency over a subset of faces, keyed by their mesh index.
    pub fn from_faces<'a>(faces: impl IntoIterator<Item = (usize, &'a Face)>) -> Self {
        let mut adjacency = Self::default();
        for (face_index, face) in faces {
            for (a, b) in face.edges() {
                if a == b {
                    continue;
                }
                adjacency.neighbors.entry(a).or_default().insert(b);
                adjacency.neighbors.entry(b).or_default().insert(a);
                adjacency
                    .edge_faces
                    .entry(edge_key(a, b))
                    .or_default()
                    .push(face_index);
            }
        }
        adjacency
    }

    /// Neighbours of a vertex in ascending id order.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.neighbors.get(&v).into_iter().flatten().copied()
    }

    /// Number of distinct neighbours.
    pub fn degree(&self, v: VertexId) -> usize {
        self.neighbors.get(&v).map_or(0, BTreeSet::len)
    }

    /// Returns true if `a` and `b` share an edge.
    pub fn has_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.edge_faces.contains_key(&edge_key(a, b))
    }

    /// Faces using the undirected edge `(a, b)`.
    pub fn faces_of_edge(&self, a: VertexId, b: VertexId) -> &[usize] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    /// Vertices touched by at least one edge.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.neighbors.keys().copied()
    }

    /// Returns true if exactly one face uses the edge.
    pub fn is_boundary_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.faces_of_edge(a, b).len() == 1
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&key, _)| key)
    }

    /// Edges used by more than two faces. Reported, never rejected.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&key, _)| key)
    }
}
