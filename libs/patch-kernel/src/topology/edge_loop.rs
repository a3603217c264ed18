//! Validation of caller-supplied vertex loops.
//!
//! Invalid loops produce a structured verdict, never an error.

use super::adjacency::AdjacencyMap;
use crate::mesh::VertexId;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Why a vertex sequence is not a closed edge loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopDefect {
    /// Fewer than three distinct vertices.
    TooShort {
        /// Number of vertices in the loop body
        len: usize,
    },
    /// A vertex appears twice inside the loop body.
    DuplicateVertex {
        /// The repeated vertex
        vertex: VertexId,
    },
    /// Two consecutive vertices do not share a mesh edge.
    NonAdjacent {
        /// Earlier vertex of the pair
        from: VertexId,
        /// Later vertex of the pair
        to: VertexId,
    },
    /// The last vertex does not connect back to the first.
    Unclosed {
        /// First vertex of the sequence
        first: VertexId,
        /// Last vertex of the sequence
        last: VertexId,
    },
}

impl fmt::Display for LoopDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopDefect::TooShort { len } => {
                write!(f, "loop has {len} vertices, need at least 3")
            }
            LoopDefect::DuplicateVertex { vertex } => {
                write!(f, "vertex {vertex} appears more than once")
            }
            LoopDefect::NonAdjacent { from, to } => {
                write!(f, "vertices {from} and {to} are not joined by an edge")
            }
            LoopDefect::Unclosed { first, last } => {
                write!(f, "last vertex {last} does not connect back to {first}")
            }
        }
    }
}

/// Verdict of [`validate_edge_loop`]: `{valid, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopValidation {
    /// True when the sequence is a closed walk over mesh edges
    pub valid: bool,
    /// The first defect found, when invalid
    pub reason: Option<LoopDefect>,
}

impl LoopValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(defect: LoopDefect) -> Self {
        Self {
            valid: false,
            reason: Some(defect),
        }
    }
}

/// Checks that `sequence` is a closed, non-repeating walk over mesh edges.
///
/// The loop may be given open (`[a, b, c]`, closing edge `c→a` implied) or
/// explicitly closed (`[a, b, c, a]`).
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh, VertexId};
/// use patch_kernel::topology::{validate_edge_loop, AdjacencyMap};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("tri");
/// for p in [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]] {
///     mesh.add_vertex(DVec2::from_array(p), DVec3::new(p[0], p[1], 0.0));
/// }
/// mesh.add_face(Face::from_raw([0, 1, 2]));
/// let adjacency = AdjacencyMap::build(&mesh);
///
/// let ids: Vec<VertexId> = [0, 1, 2, 0].into_iter().map(VertexId::new).collect();
/// assert!(validate_edge_loop(&adjacency, &ids).valid);
/// assert!(!validate_edge_loop(&adjacency, &ids[..2]).valid);
/// ```
pub fn validate_edge_loop(adjacency: &AdjacencyMap, sequence: &[VertexId]) -> LoopValidation {
    let body = match sequence {
        [first, .., last] if first == last => &sequence[..sequence.len() - 1],
        _ => sequence,
    };

    if body.len() < 3 {
        return LoopValidation::rejected(LoopDefect::TooShort { len: body.len() });
    }

    let mut seen = HashSet::with_capacity(body.len());
    if let Some(&vertex) = body.iter().find(|v| !seen.insert(**v)) {
        return LoopValidation::rejected(LoopDefect::DuplicateVertex { vertex });
    }

    if let Some(pair) = body.windows(2).find(|w| !adjacency.has_edge(w[0], w[1])) {
        return LoopValidation::rejected(LoopDefect::NonAdjacent {
            from: pair[0],
            to: pair[1],
        });
    }

    let (first, last) = (body[0], body[body.len() - 1]);
    if !adjacency.has_edge(last, first) {
        return LoopValidation::rejected(LoopDefect::Unclosed { first, last });
    }

    LoopValidation::ok()
}
