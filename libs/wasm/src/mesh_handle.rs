//! # Mesh Handle
//!
//! WASM-friendly render buffers for a patch mesh.

use patch_kernel::{Mesh, TAG_EXTRUDE_TOP, TAG_HOLE_BOUNDARY};
use wasm_bindgen::prelude::*;

/// Render buffers that can be handed to JavaScript.
///
/// Polygons are fan-triangulated; positions and UVs are in vertex order, so
/// unreferenced vertices keep their slot.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const mesh = mesh_buffers(JSON.stringify(edited));
///
/// const geometry = new THREE.BufferGeometry();
/// geometry.setAttribute('position', new THREE.BufferAttribute(mesh.positions(), 3));
/// geometry.setAttribute('uv', new THREE.BufferAttribute(mesh.uvs(), 2));
/// geometry.setIndex(new THREE.BufferAttribute(mesh.indices(), 1));
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct MeshHandle {
    /// Vertex positions as [x, y, z, x, y, z, ...]
    positions: Vec<f32>,
    /// Parametric coordinates as [u, v, u, v, ...]
    uvs: Vec<f32>,
    /// Triangle indices as [i0, i1, i2, i0, i1, i2, ...]
    indices: Vec<u32>,
    /// Provenance flags per vertex: bit 0 hole boundary, bit 1 extrude top
    flags: Vec<u8>,
}

#[wasm_bindgen]
impl MeshHandle {
    /// Returns the number of vertices.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    /// Returns the number of triangles.
    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Returns the vertex positions as a Float32Array.
    ///
    /// Length: vertex_count * 3
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.positions[..])
    }

    /// Returns the UVs as a Float32Array.
    ///
    /// Length: vertex_count * 2
    pub fn uvs(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.uvs[..])
    }

    /// Returns the triangle indices as a Uint32Array.
    ///
    /// Length: triangle_count * 3
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.indices[..])
    }

    /// Returns the per-vertex provenance flags as a Uint8Array.
    pub fn flags(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.flags[..])
    }

    /// Returns true if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl MeshHandle {
    /// Bit set in [`MeshHandle::flags`] for hole-boundary vertices.
    pub const HOLE_BOUNDARY: u8 = 1;
    /// Bit set in [`MeshHandle::flags`] for extrusion-top vertices.
    pub const EXTRUDE_TOP: u8 = 2;

    /// Creates a MeshHandle from a Mesh.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut positions = Vec::with_capacity(mesh.vertex_count() * 3);
        let mut uvs = Vec::with_capacity(mesh.vertex_count() * 2);
        let mut flags = Vec::with_capacity(mesh.vertex_count());
        for v in mesh.vertices() {
            positions.extend(v.position.to_array().map(|c| c as f32));
            uvs.extend(v.uv_or_default().to_array().map(|c| c as f32));

            let mut bits = 0;
            if v.has_tag(TAG_HOLE_BOUNDARY) {
                bits |= Self::HOLE_BOUNDARY;
            }
            if v.has_tag(TAG_EXTRUDE_TOP) {
                bits |= Self::EXTRUDE_TOP;
            }
            flags.push(bits);
        }

        let indices = mesh
            .faces()
            .iter()
            .flat_map(|f| f.fan_triangles())
            .flat_map(|t| t.map(|v| v.raw()))
            .collect();

        Self {
            positions,
            uvs,
            indices,
            flags,
        }
    }

    /// Positions as a plain slice (host side).
    pub fn position_buffer(&self) -> &[f32] {
        &self.positions
    }

    /// UVs as a plain slice (host side).
    pub fn uv_buffer(&self) -> &[f32] {
        &self.uvs
    }

    /// Indices as a plain slice (host side).
    pub fn index_buffer(&self) -> &[u32] {
        &self.indices
    }

    /// Flags as a plain slice (host side).
    pub fn flag_buffer(&self) -> &[u8] {
        &self.flags
    }
}
