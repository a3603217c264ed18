//! WASM-facing entry points for the patch kernel.
//!
//! This crate is compiled to a `cdylib` and consumed from JavaScript via
//! `wasm-bindgen`. Meshes, envelopes and results cross the boundary as JSON
//! strings. Every exported function has an `*_internal` twin returning
//! [`KernelError`] so native tests can run without a JS host.
//!
//! ```
//! let mesh = r#"{"id":"tri","vertices":[
//!     {"id":0,"u":0,"v":0,"x":0,"y":0,"z":0},
//!     {"id":1,"u":1,"v":0,"x":1,"y":0,"z":0},
//!     {"id":2,"u":0,"v":1,"x":0,"y":1,"z":0}],"faces":[[0,1,2]]}"#;
//! let out = patch_wasm::apply_operations_internal(mesh, r#"{"schemaVersion":1,"operations":[]}"#).unwrap();
//! assert!(out.contains(r#""id":"tri|ops""#));
//! ```

use patch_kernel::topology::AdjacencyMap;
use patch_kernel::{
    ExecutionReport, ExecutorConfig, KernelConfig, KernelError, KernelResult, Mesh, OperationEnvelope,
    SelectionPolicy, UvBox, VertexId,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

mod mesh_handle;

pub use mesh_handle::MeshHandle;

/// Installs a panic hook that forwards Rust panics to the browser console.
///
/// # Examples
/// ```no_run
/// // In JavaScript: import and call once at startup.
/// // import { init_panic_hook } from "patch-wasm";
/// // init_panic_hook();
/// ```
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_error(err: KernelError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Applies an operation envelope to a mesh and returns the edited mesh.
///
/// # Errors
/// Returns a JavaScript error string when either JSON document is invalid,
/// the schema version is unsupported or a known operation carries malformed
/// params.
///
/// # Examples
/// ```no_run
/// // In JavaScript:
/// // const edited = JSON.parse(apply_operations(JSON.stringify(mesh), JSON.stringify(envelope)));
/// ```
#[wasm_bindgen]
pub fn apply_operations(mesh_json: &str, envelope_json: &str) -> Result<String, JsValue> {
    apply_operations_internal(mesh_json, envelope_json).map_err(to_js_error)
}

/// Host-only twin of [`apply_operations`].
pub fn apply_operations_internal(mesh_json: &str, envelope_json: &str) -> KernelResult<String> {
    let mesh = Mesh::from_json(mesh_json)?;
    let envelope = OperationEnvelope::from_json(envelope_json)?;
    let execution = patch_kernel::apply_envelope(&mesh, envelope, &ExecutorConfig::default())?;
    execution.mesh.to_json()
}

/// Like [`apply_operations_internal`], but returns the execution report
/// next to the mesh: `{mesh, report}`.
pub fn apply_operations_with_report_internal(
    mesh_json: &str,
    envelope_json: &str,
) -> KernelResult<String> {
    let mesh = Mesh::from_json(mesh_json)?;
    let envelope = OperationEnvelope::from_json(envelope_json)?;
    let execution = patch_kernel::apply_envelope(&mesh, envelope, &ExecutorConfig::default())?;
    let result = EditResult {
        mesh: &execution.mesh,
        report: &execution.report,
    };
    Ok(serde_json::to_string(&result)?)
}

#[derive(Serialize)]
struct EditResult<'a> {
    mesh: &'a Mesh,
    report: &'a ExecutionReport,
}

/// [`apply_operations`] variant returning `{mesh, report}`.
#[wasm_bindgen]
pub fn apply_operations_with_report(mesh_json: &str, envelope_json: &str) -> Result<String, JsValue> {
    apply_operations_with_report_internal(mesh_json, envelope_json).map_err(to_js_error)
}

/// Computes a Tutte embedding and returns `{uv, metrics}`.
///
/// `uv` holds one `[u, v]` pair per vertex, in vertex order.
#[wasm_bindgen]
pub fn parametrize(mesh_json: &str) -> Result<String, JsValue> {
    parametrize_internal(mesh_json).map_err(to_js_error)
}

/// Host-only twin of [`parametrize`].
pub fn parametrize_internal(mesh_json: &str) -> KernelResult<String> {
    let mesh = Mesh::from_json(mesh_json)?;
    let embedding = patch_kernel::parametrize(&mesh, &KernelConfig::default());
    Ok(serde_json::to_string(&embedding)?)
}

/// Selects the region inside a UV box and returns
/// `{vertexIds, faceIndices, triangles}`.
///
/// `partial` switches from full containment to partial overlap.
#[wasm_bindgen]
pub fn select_uv_region(
    mesh_json: &str,
    u_min: f64,
    u_max: f64,
    v_min: f64,
    v_max: f64,
    partial: bool,
) -> Result<String, JsValue> {
    select_uv_region_internal(mesh_json, UvBox::new(u_min, u_max, v_min, v_max), partial)
        .map_err(to_js_error)
}

/// Host-only twin of [`select_uv_region`].
pub fn select_uv_region_internal(mesh_json: &str, bounds: UvBox, partial: bool) -> KernelResult<String> {
    let mesh = Mesh::from_json(mesh_json)?;
    let policy = if partial {
        SelectionPolicy::PartialOverlap
    } else {
        SelectionPolicy::FullContainment
    };
    let config = KernelConfig::default();
    let region = patch_kernel::select_uv_region(&mesh, &bounds, policy, config.containment_epsilon);
    Ok(serde_json::to_string(&region)?)
}

/// Checks a vertex-id sequence against the mesh edges and returns
/// `{valid, reason}`.
#[wasm_bindgen]
pub fn validate_edge_loop(mesh_json: &str, loop_ids: Vec<u32>) -> Result<String, JsValue> {
    validate_edge_loop_internal(mesh_json, &loop_ids).map_err(to_js_error)
}

/// Host-only twin of [`validate_edge_loop`].
pub fn validate_edge_loop_internal(mesh_json: &str, loop_ids: &[u32]) -> KernelResult<String> {
    let mesh = Mesh::from_json(mesh_json)?;
    let adjacency = AdjacencyMap::build(&mesh);
    let sequence: Vec<VertexId> = loop_ids.iter().copied().map(VertexId::new).collect();
    let verdict = patch_kernel::validate_edge_loop(&adjacency, &sequence);
    Ok(serde_json::to_string(&verdict)?)
}

/// Builds GPU buffers for a mesh.
///
/// # Examples
/// ```no_run
/// // In JavaScript:
/// // const handle = mesh_buffers(JSON.stringify(mesh));
/// // geometry.setAttribute('position', new THREE.BufferAttribute(handle.positions(), 3));
/// ```
#[wasm_bindgen]
pub fn mesh_buffers(mesh_json: &str) -> Result<MeshHandle, JsValue> {
    mesh_buffers_internal(mesh_json).map_err(to_js_error)
}

/// Host-only twin of [`mesh_buffers`].
pub fn mesh_buffers_internal(mesh_json: &str) -> KernelResult<MeshHandle> {
    Ok(MeshHandle::from_mesh(&Mesh::from_json(mesh_json)?))
}

/// Returns the envelope schema version this build reads.
///
/// # Examples
/// ```
/// assert_eq!(patch_wasm::supported_schema_version(), 1);
/// ```
#[wasm_bindgen]
pub fn supported_schema_version() -> u32 {
    config::constants::SUPPORTED_SCHEMA_VERSION
}
