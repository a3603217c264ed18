//! # Patch Kernel
//!
//! Flattening and editing of surface-mesh patches.
//! Maps a disk-topology patch into the unit UV square, locates UV points on
//! the surface and applies hole and extrude edits addressed by UV boxes.
//!
//! ## Architecture
//!
//! ```text
//! Mesh ──parametrize──→ UV embedding
//!   │                         │
//!   └── OperationEnvelope ──→ select_uv_region → add_hole / extrude_region
//!                                                   │
//!                                      Mesh (id "<input>|ops") + report
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are browser-safe (pure Rust, no native dependencies):
//! - **Parametrization**: Tutte embedding, Jacobi-preconditioned CG
//! - **Point location**: UV bounding-volume hierarchy
//! - **Region selection**: containment and separating-axis overlap
//! - **Hole cutting**: polygon difference and ear clipping
//!
//! ## Usage
//!
//! ```rust
//! use patch_kernel::{execute_operations, ExecutorConfig, Face, HoleParams, Mesh, Operation, OperationKind, UvBox};
//! use glam::{DVec2, DVec3};
//!
//! let mut mesh = Mesh::new("plate");
//! for j in 0..=4 {
//!     for i in 0..=4 {
//!         let (u, v) = (i as f64 / 4.0, j as f64 / 4.0);
//!         mesh.add_vertex(DVec2::new(u, v), DVec3::new(40.0 * u, 40.0 * v, 0.0));
//!     }
//! }
//! for j in 0..4u32 {
//!     for i in 0..4u32 {
//!         let a = j * 5 + i;
//!         mesh.add_face(Face::from_raw([a, a + 1, a + 6]));
//!         mesh.add_face(Face::from_raw([a, a + 6, a + 5]));
//!     }
//! }
//!
//! let hole = Operation::new(
//!     "h1",
//!     UvBox::new(0.25, 0.75, 0.25, 0.75),
//!     OperationKind::AddHole(HoleParams::circular(6.0)),
//! );
//! let out = execute_operations(&mesh, &[hole], &ExecutorConfig::default())?;
//! assert_eq!(out.report.applied, vec!["h1".to_string()]);
//! assert_eq!(out.mesh.id(), "plate|ops");
//! # Ok::<(), patch_kernel::KernelError>(())
//! ```

pub mod error;
pub mod geometry;
pub mod mesh;
pub mod ops;
pub mod param;
pub mod region;
pub mod spatial;
pub mod topology;

#[cfg(test)]
mod test_support;

pub use error::{KernelError, KernelResult};
pub use geometry::UvBox;
pub use mesh::{Face, Mesh, Vertex, VertexId, TAG_EXTRUDE_TOP, TAG_HOLE_BOUNDARY};
pub use ops::{
    apply_envelope, execute_operations, parametrize_and_execute, Direction, EditSummary,
    Execution, ExecutionReport, ExecutorConfig, ExtrudeParams, HoleParams, Operation,
    OperationEnvelope, OperationKind, OrderingPolicy, SkipReason,
};
pub use param::{parametrize, EmbeddingMetrics, TutteEmbedding};
pub use region::{select_uv_region, Region, SelectionPolicy};
pub use spatial::Bvh;
pub use topology::{validate_edge_loop, AdjacencyMap, LoopValidation};

pub use config::settings::KernelConfig;
