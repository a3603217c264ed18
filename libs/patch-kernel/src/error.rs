//! # Kernel Errors
//!
//! Error types for the patch kernel.
//!
//! ## Error Policy
//!
//! Geometry degrades silently: empty regions and unsupported parameter
//! combinations are skipped, solver non-convergence and flipped triangles
//! are reported through metrics, and a failed UV lift is `None`. Errors are
//! reserved for contract violations at the boundary: malformed meshes,
//! undecodable envelopes and unsatisfiable dependency orderings.

use config::settings::ConfigError;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur when loading input or ordering operations.
///
/// ## Example
///
/// ```rust
/// use patch_kernel::{KernelError, Mesh};
///
/// match Mesh::from_json(r#"{"id":"m","vertices":[],"faces":[[0,1,2]]}"#) {
///     Ok(mesh) => println!("Loaded {} vertices", mesh.vertex_count()),
///     Err(KernelError::FaceIndexOutOfRange { face, .. }) => eprintln!("bad face {face}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum KernelError {
    /// The mesh violates a structural invariant.
    #[error("Invalid mesh: {message}")]
    InvalidMesh {
        /// Description of the violated invariant
        message: String,
    },

    /// A face references a vertex id past the end of the vertex arena.
    #[error("Face {face} references vertex {vertex} but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        /// Position of the offending face
        face: usize,
        /// The out-of-range vertex id
        vertex: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// The envelope was written for a newer schema.
    #[error("Unsupported schema version {found} (supported up to {supported})")]
    UnsupportedSchemaVersion {
        /// Version found in the envelope
        found: u32,
        /// Highest version this kernel reads
        supported: u32,
    },

    /// A known operation type carried parameters of the wrong shape.
    #[error("Malformed params for operation '{op_id}': {message}")]
    MalformedParams {
        /// Id of the offending operation
        op_id: String,
        /// Decoder message
        message: String,
    },

    /// Dependency ordering was requested and `dependsOn` forms a cycle.
    #[error("Dependency cycle between operations: {}", .op_ids.join(", "))]
    DependencyCycle {
        /// Operations that could not be ordered
        op_ids: Vec<String>,
    },

    /// Dependency ordering was requested and an operation names an unknown id.
    #[error("Operation '{op_id}' depends on unknown operation '{dependency}'")]
    UnknownDependency {
        /// Id of the dependent operation
        op_id: String,
        /// The id that could not be found
        dependency: String,
    },

    /// JSON could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration snapshot failed validation.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl KernelError {
    /// Creates an invalid mesh error.
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// Creates a malformed params error.
    pub fn malformed_params(op_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedParams {
            op_id: op_id.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KernelError::FaceIndexOutOfRange {
            face: 3,
            vertex: 12,
            vertex_count: 8,
        };
        assert!(err.to_string().contains("Face 3"));
        assert!(err.to_string().contains("12"));

        let cycle = KernelError::DependencyCycle {
            op_ids: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(cycle.to_string(), "Dependency cycle between operations: a, b");
    }

    #[test]
    fn test_config_error_converts() {
        let err: KernelError = ConfigError::InvalidSegments(2).into();
        assert!(err.to_string().contains("hole_segments"));
    }

    /// Errors cross thread boundaries when callers run the kernel on a worker.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KernelError>();
    }
}
