//! # Mesh Data Structure
//!
//! Polygon mesh carrying both a 3D position and a parametric (u,v)
//! coordinate on every vertex.
//!
//! Vertices live in an append-only arena addressed by [`VertexId`] handles:
//! a vertex's id is its position in the arena, ids are never reused, and
//! edits that drop faces leave their vertices in place, unreferenced. Faces
//! are identified only by their position in the face list.

use crate::error::{KernelError, KernelResult};
use config::constants::{DEFAULT_UV, DERIVED_MESH_SUFFIX};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Provenance tag for vertices created along a cut hole.
pub const TAG_HOLE_BOUNDARY: &str = "hole_boundary";

/// Provenance tag for the displaced copies created by an extrusion.
pub const TAG_EXTRUDE_TOP: &str = "extrude_top";

/// Stable handle of a vertex in a [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Wraps a raw id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id as it appears on the wire.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position in the vertex arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for VertexId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mesh vertex.
///
/// Tags record provenance only and are never consulted by geometry code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VertexRecord", into = "VertexRecord")]
pub struct Vertex {
    /// Handle, equal to the vertex's position in the mesh
    pub id: VertexId,
    /// Parametric coordinate
    pub uv: DVec2,
    /// World-space position
    pub position: DVec3,
    /// Provenance tags such as [`TAG_HOLE_BOUNDARY`]
    pub tags: Vec<String>,
}

impl Vertex {
    /// Creates an untagged vertex.
    pub fn new(id: VertexId, uv: DVec2, position: DVec3) -> Self {
        Self {
            id,
            uv,
            position,
            tags: Vec::new(),
        }
    }

    /// Returns true if the vertex carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The vertex UV, or the patch centre when it is not finite.
    pub fn uv_or_default(&self) -> DVec2 {
        if self.uv.is_finite() {
            self.uv
        } else {
            DVec2::from_array(DEFAULT_UV)
        }
    }
}

/// Flat wire layout of a vertex: `{id, u, v, x, y, z, tags?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VertexRecord {
    id: u32,
    u: f64,
    v: f64,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl From<VertexRecord> for Vertex {
    fn from(r: VertexRecord) -> Self {
        Self {
            id: VertexId(r.id),
            uv: DVec2::new(r.u, r.v),
            position: DVec3::new(r.x, r.y, r.z),
            tags: r.tags,
        }
    }
}

impl From<Vertex> for VertexRecord {
    fn from(v: Vertex) -> Self {
        Self {
            id: v.id.raw(),
            u: v.uv.x,
            v: v.uv.y,
            x: v.position.x,
            y: v.position.y,
            z: v.position.z,
            tags: v.tags,
        }
    }
}

/// An ordered polygon of vertex handles. Winding fixes the outward normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face {
    vertices: Vec<VertexId>,
}

impl Face {
    /// Creates a face from vertex handles.
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self { vertices }
    }

    /// Creates a face from raw ids.
    ///
    /// # Example
    ///
    /// ```rust
    /// use patch_kernel::Face;
    ///
    /// let quad = Face::from_raw([0, 1, 2, 3]);
    /// assert_eq!(quad.len(), 4);
    /// assert_eq!(quad.fan_triangles().count(), 2);
    /// ```
    pub fn from_raw(ids: impl IntoIterator<Item = u32>) -> Self {
        Self::new(ids.into_iter().map(VertexId::new).collect())
    }

    /// A triangle face.
    pub fn triangle(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Vertex handles in winding order.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the face has no corners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Directed edges in winding order, wrapping last→first.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Fan triangulation `(v0, vi, vi+1)`.
    pub fn fan_triangles(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        let first = self.vertices.first().copied();
        self.vertices
            .windows(2)
            .skip(1)
            .filter_map(move |w| first.map(|v0| [v0, w[0], w[1]]))
    }

    /// The same polygon with every handle passed through `f`.
    pub fn remapped(&self, mut f: impl FnMut(VertexId) -> VertexId) -> Self {
        Self::new(self.vertices.iter().map(|&v| f(v)).collect())
    }
}

/// A polygon mesh with per-vertex UV.
///
/// Cloning is the editing model: every edit runs on a copy and the caller's
/// mesh is never touched.
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("panel");
/// let a = mesh.add_vertex(DVec2::new(0.0, 0.0), DVec3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(DVec2::new(1.0, 0.0), DVec3::new(10.0, 0.0, 0.0));
/// let c = mesh.add_vertex(DVec2::new(0.0, 1.0), DVec3::new(0.0, 10.0, 0.0));
/// mesh.add_face(Face::triangle(a, b, c));
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    id: String,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Creates a mesh from parts and validates it.
    pub fn from_parts(
        id: impl Into<String>,
        vertices: Vec<Vertex>,
        faces: Vec<Face>,
    ) -> KernelResult<Self> {
        let mesh = Self {
            id: id.into(),
            vertices,
            faces,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Decodes a mesh from its JSON wire form and validates it.
    pub fn from_json(json: &str) -> KernelResult<Self> {
        let mesh: Self = serde_json::from_str(json)?;
        mesh.validate()?;
        Ok(mesh)
    }

    /// Encodes the mesh to its JSON wire form.
    pub fn to_json(&self) -> KernelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Mesh identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Identifier marking this mesh as derived by an operation list.
    pub fn derived_id(&self) -> String {
        format!("{}{}", self.id, DERIVED_MESH_SUFFIX)
    }

    /// Returns the number of vertices, referenced or not.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles in the fan triangulation of all faces.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    /// Returns true if the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertices in id order.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All faces.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Looks up a vertex.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// World position of a vertex.
    #[inline]
    pub fn position(&self, id: VertexId) -> Option<DVec3> {
        self.vertex(id).map(|v| v.position)
    }

    /// Parametric coordinate of a vertex, if it exists and is finite.
    #[inline]
    pub fn uv(&self, id: VertexId) -> Option<DVec2> {
        self.vertex(id).map(|v| v.uv).filter(|uv| uv.is_finite())
    }

    /// Overwrites a vertex UV. Unknown ids are ignored.
    pub fn set_uv(&mut self, id: VertexId, uv: DVec2) {
        if let Some(v) = self.vertices.get_mut(id.index()) {
            v.uv = uv;
        }
    }

    /// Writes a per-vertex UV embedding (indexed by vertex position) back
    /// onto the vertices. Extra entries are ignored; missing ones leave the
    /// vertex untouched.
    pub fn with_embedding(mut self, uv: &[DVec2]) -> Self {
        for (vertex, &value) in self.vertices.iter_mut().zip(uv) {
            vertex.uv = value;
        }
        self
    }

    /// Appends a vertex and returns its handle.
    pub fn add_vertex(&mut self, uv: DVec2, position: DVec3) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex::new(id, uv, position));
        id
    }

    /// Appends a vertex carrying a provenance tag.
    pub fn add_tagged_vertex(&mut self, uv: DVec2, position: DVec3, tag: &str) -> VertexId {
        let id = self.add_vertex(uv, position);
        self.vertices[id.index()].tags.push(tag.to_string());
        id
    }

    /// Appends a face.
    pub fn add_face(&mut self, face: Face) {
        debug_assert!(
            face.vertices().iter().all(|v| v.index() < self.vertices.len()),
            "face references a vertex outside the arena"
        );
        self.faces.push(face);
    }

    /// Removes the faces at `remove` and appends `replacements`.
    ///
    /// Surviving faces keep their relative order; indices in `remove` that
    /// are out of range are ignored.
    pub fn replace_faces(&mut self, remove: &[usize], replacements: Vec<Face>) {
        let remove: BTreeSet<usize> = remove.iter().copied().collect();
        let mut index = 0;
        self.faces.retain(|_| {
            let keep = !remove.contains(&index);
            index += 1;
            keep
        });
        self.faces.extend(replacements);
    }

    /// Vertices used by at least one face.
    pub fn referenced_vertices(&self) -> BTreeSet<VertexId> {
        self.faces
            .iter()
            .flat_map(|f| f.vertices().iter().copied())
            .collect()
    }

    /// Vertices no face uses (left behind by edits).
    pub fn orphaned_vertices(&self) -> Vec<VertexId> {
        let referenced = self.referenced_vertices();
        self.vertices
            .iter()
            .map(|v| v.id)
            .filter(|id| !referenced.contains(id))
            .collect()
    }

    /// World positions of a face's corners. `None` if any id is unknown.
    pub fn face_positions(&self, face: &Face) -> Option<Vec<DVec3>> {
        face.vertices().iter().map(|&v| self.position(v)).collect()
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        let mut min = first.position;
        let mut max = first.position;
        for v in &self.vertices[1..] {
            min = min.min(v.position);
            max = max.max(v.position);
        }

        (min, max)
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - Every vertex id equals its position
    /// - Every face has at least three corners
    /// - Every face index is in range
    pub fn validate(&self) -> KernelResult<()> {
        for (position, vertex) in self.vertices.iter().enumerate() {
            if vertex.id.index() != position {
                return Err(KernelError::invalid_mesh(format!(
                    "vertex at position {position} has id {}",
                    vertex.id
                )));
            }
        }

        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(KernelError::invalid_mesh(format!(
                    "face {face_index} has {} vertices (need at least 3)",
                    face.len()
                )));
            }
            if let Some(bad) = face.vertices().iter().find(|v| v.index() >= vertex_count) {
                return Err(KernelError::FaceIndexOutOfRange {
                    face: face_index,
                    vertex: bad.raw(),
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}
