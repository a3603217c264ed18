//! # Operation Executor
//!
//! Applies an ordered operation list to a clone of the input mesh. Each
//! operation resolves its UV box against the mesh as it stands after the
//! previous ones, so later operations see earlier edits.

use super::envelope::OperationEnvelope;
use super::{extrude, hole, CapType, ExtrudeMode, HoleShape, Operation, OperationKind};
use crate::error::{KernelError, KernelResult};
use crate::mesh::Mesh;
use crate::param::{parametrize, EmbeddingMetrics};
use crate::region::{select_uv_region, SelectionPolicy};
use config::settings::KernelConfig;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// How operations are ordered before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Ascending priority, ties in input order. `dependsOn` is informational.
    #[default]
    Priority,
    /// Topological order over `dependsOn`, ties broken by priority then
    /// input order. Cycles and unknown ids are errors.
    Dependencies,
}

/// Executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExecutorConfig {
    /// Operation ordering
    pub ordering: OrderingPolicy,
    /// Tolerances and limits
    pub kernel: KernelConfig,
}

impl ExecutorConfig {
    /// Uses dependency ordering.
    pub fn with_dependencies(mut self) -> Self {
        self.ordering = OrderingPolicy::Dependencies;
        self
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Why an operation was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The target box selected no faces.
    EmptyRegion,
    /// Unknown operation type.
    UnsupportedKind {
        /// The wire type string
        kind: String,
    },
    /// Known type with a parameter combination that is not executed.
    UnsupportedParams {
        /// What was rejected
        detail: String,
    },
    /// The region has no boundary loop to cut against.
    NoBoundary,
    /// The region has no usable extent.
    DegenerateRegion,
}

impl SkipReason {
    pub(crate) fn unsupported_params(detail: impl Into<String>) -> Self {
        Self::UnsupportedParams {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRegion => write!(f, "target region is empty"),
            SkipReason::UnsupportedKind { kind } => write!(f, "unsupported operation type '{kind}'"),
            SkipReason::UnsupportedParams { detail } => write!(f, "unsupported parameters: {detail}"),
            SkipReason::NoBoundary => write!(f, "region has no boundary"),
            SkipReason::DegenerateRegion => write!(f, "region is degenerate"),
        }
    }
}

/// Size of one applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSummary {
    /// Region faces removed
    pub removed_faces: usize,
    /// Faces appended
    pub added_faces: usize,
    /// Vertices appended
    pub added_vertices: usize,
}

/// An operation that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOperation {
    /// Operation id
    pub op_id: String,
    /// Why it was skipped
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// What happened to each operation, in execution order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    /// Applied operation ids
    pub applied: Vec<String>,
    /// Skipped operations
    pub skipped: Vec<SkippedOperation>,
    /// Metrics of the embedding computed before execution, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingMetrics>,
}

/// Edited mesh plus report.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// The edited clone, id `<input>|ops`
    pub mesh: Mesh,
    /// Per-operation outcome
    pub report: ExecutionReport,
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Applies `operations` to a clone of `mesh`.
///
/// The input is never modified. Geometry problems skip the operation;
/// errors come only from dependency ordering.
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh};
/// use patch_kernel::geometry::UvBox;
/// use patch_kernel::ops::{execute_operations, ExecutorConfig, Operation, OperationKind};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("quad");
/// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
///     mesh.add_vertex(DVec2::from_array(p), DVec3::new(p[0], p[1], 0.0));
/// }
/// mesh.add_face(Face::from_raw([0, 1, 2]));
/// mesh.add_face(Face::from_raw([0, 2, 3]));
///
/// let unknown = Operation::new("x", UvBox::unit(), OperationKind::Unsupported { kind: "fillet".into() });
/// let out = execute_operations(&mesh, &[unknown], &ExecutorConfig::default())?;
/// assert_eq!(out.mesh.id(), "quad|ops");
/// assert_eq!(out.report.skipped.len(), 1);
/// # Ok::<(), patch_kernel::KernelError>(())
/// ```
pub fn execute_operations(
    mesh: &Mesh,
    operations: &[Operation],
    config: &ExecutorConfig,
) -> KernelResult<Execution> {
    let order = match config.ordering {
        OrderingPolicy::Priority => priority_order(operations),
        OrderingPolicy::Dependencies => dependency_order(operations)?,
    };
    debug!(
        "Execution order: {:?}",
        order.iter().map(|&i| operations[i].id.as_str()).collect::<Vec<_>>()
    );

    let mut output = mesh.clone();
    output.set_id(mesh.derived_id());
    let mut report = ExecutionReport::default();

    for operation in order.into_iter().map(|i| &operations[i]) {
        match apply(&mut output, operation, &config.kernel) {
            Ok(summary) => {
                info!(
                    "Applied {} '{}': -{} +{} faces, +{} vertices",
                    operation.kind.name(),
                    operation.id,
                    summary.removed_faces,
                    summary.added_faces,
                    summary.added_vertices
                );
                report.applied.push(operation.id.clone());
            }
            Err(reason) => {
                warn!("Skipped {} '{}': {}", operation.kind.name(), operation.id, reason);
                report.skipped.push(SkippedOperation {
                    op_id: operation.id.clone(),
                    reason,
                });
            }
        }
    }

    Ok(Execution {
        mesh: output,
        report,
    })
}

/// Decodes and applies an envelope.
pub fn apply_envelope(
    mesh: &Mesh,
    envelope: OperationEnvelope,
    config: &ExecutorConfig,
) -> KernelResult<Execution> {
    let operations = envelope.into_operations()?;
    execute_operations(mesh, &operations, config)
}

/// Parametrizes `mesh`, writes the embedding onto the clone and then
/// applies `operations` against the fresh UV.
pub fn parametrize_and_execute(
    mesh: &Mesh,
    operations: &[Operation],
    config: &ExecutorConfig,
) -> KernelResult<Execution> {
    let embedding = parametrize(mesh, &config.kernel);
    let embedded = mesh.clone().with_embedding(&embedding.uv);
    let mut execution = execute_operations(&embedded, operations, config)?;
    execution.report.embedding = Some(embedding.metrics);
    Ok(execution)
}

// =============================================================================
// DISPATCH
// =============================================================================

fn apply(mesh: &mut Mesh, operation: &Operation, config: &KernelConfig) -> Result<EditSummary, SkipReason> {
    let region = select_uv_region(
        mesh,
        &operation.target,
        SelectionPolicy::FullContainment,
        config.containment_epsilon,
    );
    if region.is_empty() {
        return Err(SkipReason::EmptyRegion);
    }

    match &operation.kind {
        OperationKind::AddHole(params) => match (params.shape, params.through_all) {
            (HoleShape::Circular, true) => {
                hole::add_hole(mesh, &region, &operation.target, params, config)
            }
            (shape, through_all) => Err(SkipReason::unsupported_params(format!(
                "{shape:?} hole, throughAll={through_all}"
            ))),
        },
        OperationKind::ExtrudeRegion(params) => match (params.mode, params.cap_type) {
            (ExtrudeMode::Solid, CapType::Flat) => extrude::extrude_region(mesh, &region, params),
            (mode, cap) => Err(SkipReason::unsupported_params(format!(
                "{mode:?} extrusion with {cap:?} cap"
            ))),
        },
        OperationKind::Unsupported { kind } => Err(SkipReason::UnsupportedKind { kind: kind.clone() }),
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Stable ascending-priority order.
fn priority_order(operations: &[Operation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..operations.len()).collect();
    order.sort_by_key(|&i| operations[i].priority);
    order
}

/// Kahn's algorithm with a `(priority, input index)` ready queue.
fn dependency_order(operations: &[Operation]) -> KernelResult<Vec<usize>> {
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(operations.len());
    for (i, op) in operations.iter().enumerate() {
        index_of.entry(op.id.as_str()).or_insert(i);
    }

    let mut in_degree = vec![0usize; operations.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); operations.len()];
    for (i, op) in operations.iter().enumerate() {
        for dependency in &op.depends_on {
            let Some(&j) = index_of.get(dependency.as_str()) else {
                return Err(KernelError::UnknownDependency {
                    op_id: op.id.clone(),
                    dependency: dependency.clone(),
                });
            };
            dependents[j].push(i);
            in_degree[i] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(i64, usize)>> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse((operations[i].priority, i)))
        .collect();

    let mut order = Vec::with_capacity(operations.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        order.push(i);
        for &k in &dependents[i] {
            in_degree[k] -= 1;
            if in_degree[k] == 0 {
                ready.push(Reverse((operations[k].priority, k)));
            }
        }
    }

    if order.len() < operations.len() {
        let op_ids = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d > 0)
            .map(|(i, _)| operations[i].id.clone())
            .collect();
        return Err(KernelError::DependencyCycle { op_ids });
    }
    Ok(order)
}
