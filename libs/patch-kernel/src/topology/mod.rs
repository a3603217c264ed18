//! # Mesh Topology
//!
//! Combinatorial structure derived from the face list:
//! - **adjacency**: vertex neighbours and edge→face incidence
//! - **boundary**: oriented boundary loops of open patches
//! - **edge_loop**: validation of caller-supplied vertex loops

pub mod adjacency;
pub mod boundary;
pub mod edge_loop;


pub use adjacency::{edge_key, AdjacencyMap, EdgeKey};
pub use boundary::{
    extract_boundary_loops, extract_region_boundary_loops, BoundaryLoop, OrientationSpace,
};
pub use edge_loop::{validate_edge_loop, LoopDefect, LoopValidation};
