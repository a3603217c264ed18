//! # Harmonic Parametrization
//!
//! Tutte embedding of a disk-like mesh into the unit square: the outer
//! boundary loop is pinned to a circle by arc length and every interior
//! vertex is placed at the average of its neighbours, which amounts to
//! solving the uniform graph Laplacian once for u and once for v.
//!
//! Dirichlet values are moved to the right-hand side so the assembled system
//! stays symmetric positive definite and can be handed to conjugate
//! gradient.

mod solver;
mod sparse;

#[cfg(test)]
mod tests;

pub use solver::{ConjugateGradient, SolveResult, SolverConfig};
pub use sparse::SparseMatrix;

use crate::geometry::triangle_signed_area;
use crate::mesh::{Mesh, VertexId};
use crate::topology::{extract_boundary_loops, AdjacencyMap, BoundaryLoop, OrientationSpace};
use config::constants::{near_zero, DEGENERATE_AREA_EPSILON, PERIMETER_EPSILON};
use config::settings::KernelConfig;
use glam::DVec2;
use nalgebra::DVector;
use serde::Serialize;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

/// Quality metrics of an embedding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingMetrics {
    /// CG iterations spent on the u system.
    pub iterations_u: usize,
    /// CG iterations spent on the v system.
    pub iterations_v: usize,
    /// Larger of the two final residual norms.
    pub residual_norm: f64,
    /// True when both solves reached the tolerance (or no solve was needed).
    pub converged: bool,
    /// Number of coordinates that had to be clamped into [0,1].
    pub clamped_count: usize,
    /// Faces with a fan triangle of near-zero UV area.
    pub degenerate_faces: usize,
    /// Fan triangles with non-positive UV area.
    pub flipped_triangles: usize,
    /// `flipped_triangles` over the total fan triangle count.
    pub flipped_fraction: f64,
}

/// Per-vertex UV coordinates plus metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutteEmbedding {
    /// UV per vertex, indexed by vertex position.
    pub uv: Vec<DVec2>,
    /// Solve and quality metrics.
    pub metrics: EmbeddingMetrics,
}

impl TutteEmbedding {
    /// UV of a vertex.
    pub fn get(&self, id: VertexId) -> Option<DVec2> {
        self.uv.get(id.index()).copied()
    }

    /// Writes the embedding onto `mesh`.
    pub fn apply_to(&self, mesh: &mut Mesh) {
        for (index, &uv) in self.uv.iter().enumerate() {
            mesh.set_uv(VertexId::new(index as u32), uv);
        }
    }
}

/// Computes a Tutte embedding of `mesh` into [0,1]².
///
/// A mesh without boundary keeps its current UV (non-finite values replaced
/// by the default). Non-convergence is reported in the metrics, never as an
/// error.
///
/// # Example
///
/// ```rust
/// use patch_kernel::{Face, Mesh};
/// use patch_kernel::param::parametrize;
/// use config::settings::KernelConfig;
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = Mesh::new("quad");
/// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
///     mesh.add_vertex(DVec2::ZERO, DVec3::new(p[0], p[1], 0.0));
/// }
/// mesh.add_face(Face::from_raw([0, 1, 2]));
/// mesh.add_face(Face::from_raw([0, 2, 3]));
///
/// let embedding = parametrize(&mesh, &KernelConfig::default());
/// assert_eq!(embedding.metrics.flipped_triangles, 0);
/// assert!(embedding.uv.iter().all(|uv| uv.cmpge(DVec2::ZERO).all() && uv.cmple(DVec2::ONE).all()));
/// ```
pub fn parametrize(mesh: &Mesh, config: &KernelConfig) -> TutteEmbedding {
    let loops = extract_boundary_loops(mesh, OrientationSpace::Xy);
    let Some(outer) = loops.first() else {
        debug!("Mesh {} has no boundary, keeping existing UV", mesh.id());
        let uv: Vec<DVec2> = mesh.vertices().iter().map(|v| v.uv_or_default()).collect();
        let metrics = EmbeddingMetrics {
            converged: true,
            ..quality_metrics(mesh, &uv)
        };
        return TutteEmbedding { uv, metrics };
    };

    let n = mesh.vertex_count();
    let adjacency = AdjacencyMap::build(mesh);

    // Pinned values: outer boundary on the circle, orphans at their own UV.
    let mut pinned: Vec<Option<DVec2>> = vec![None; n];
    for (v, uv) in circle_boundary(mesh, outer) {
        pinned[v.index()] = Some(uv);
    }
    for vertex in mesh.vertices() {
        if adjacency.degree(vertex.id) == 0 {
            pinned[vertex.id.index()] = Some(vertex.uv_or_default());
        }
    }

    let (matrix, rhs_u, rhs_v) = assemble_laplacian(&adjacency, &pinned);
    debug!(
        "Assembled {}x{} Laplacian with {} entries ({} boundary vertices)",
        matrix.dim(),
        matrix.dim(),
        matrix.nnz(),
        outer.len()
    );

    let solver = ConjugateGradient::new(SolverConfig::from(config));
    let (solve_u, solve_v) = solve_pair(&solver, &matrix, &rhs_u, &rhs_v);

    let mut clamped_count = 0;
    let uv: Vec<DVec2> = solve_u
        .solution
        .iter()
        .zip(&solve_v.solution)
        .map(|(&u, &v)| DVec2::new(clamp_unit(u, &mut clamped_count), clamp_unit(v, &mut clamped_count)))
        .collect();

    let converged = solve_u.converged && solve_v.converged;
    let metrics = EmbeddingMetrics {
        iterations_u: solve_u.iterations,
        iterations_v: solve_v.iterations,
        residual_norm: solve_u.residual_norm.max(solve_v.residual_norm),
        converged,
        clamped_count,
        ..quality_metrics(mesh, &uv)
    };

    if !converged {
        warn!(
            "Parametrization of {} did not converge: residual {:.3e} after {}/{} iterations",
            mesh.id(),
            metrics.residual_norm,
            metrics.iterations_u,
            metrics.iterations_v
        );
    }
    if metrics.flipped_triangles > 0 {
        warn!(
            "Parametrization of {} has {} flipped triangles ({:.2}%)",
            mesh.id(),
            metrics.flipped_triangles,
            metrics.flipped_fraction * 100.0
        );
    }
    info!(
        "Parametrized {} vertices of {} in {}+{} iterations (residual {:.3e}, {} clamped)",
        n,
        mesh.id(),
        metrics.iterations_u,
        metrics.iterations_v,
        metrics.residual_norm,
        clamped_count
    );

    TutteEmbedding { uv, metrics }
}

/// Places the loop on the circle of radius 0.5 around (0.5, 0.5) by
/// cumulative 3D arc length, starting at angle zero.
fn circle_boundary(mesh: &Mesh, outer: &BoundaryLoop) -> Vec<(VertexId, DVec2)> {
    let vertices = outer.vertices();
    let count = vertices.len();
    let total = outer.perimeter();

    let mut arc = 0.0;
    let mut placed = Vec::with_capacity(count);
    for (i, &v) in vertices.iter().enumerate() {
        let t = if total > PERIMETER_EPSILON {
            arc / total
        } else {
            i as f64 / count as f64
        };
        let angle = TAU * t;
        placed.push((v, DVec2::splat(0.5) + 0.5 * DVec2::new(angle.cos(), angle.sin())));

        let next = vertices[(i + 1) % count];
        if let (Some(a), Some(b)) = (mesh.position(v), mesh.position(next)) {
            arc += a.distance(b);
        }
    }
    placed
}

/// Uniform Laplacian with pinned rows as identity. Pinned neighbours of a
/// free row contribute to its right-hand side instead of the matrix.
fn assemble_laplacian(
    adjacency: &AdjacencyMap,
    pinned: &[Option<DVec2>],
) -> (SparseMatrix, DVector<f64>, DVector<f64>) {
    let n = pinned.len();
    let mut rhs_u = DVector::zeros(n);
    let mut rhs_v = DVector::zeros(n);
    let mut triplets = Vec::new();

    for (row, fixed) in pinned.iter().enumerate() {
        if let Some(uv) = fixed {
            triplets.push((row, row, 1.0));
            rhs_u[row] = uv.x;
            rhs_v[row] = uv.y;
            continue;
        }

        let v = VertexId::new(row as u32);
        triplets.push((row, row, adjacency.degree(v) as f64));
        for neighbor in adjacency.neighbors(v) {
            let col = neighbor.index();
            match pinned.get(col).copied().flatten() {
                Some(uv) => {
                    rhs_u[row] += uv.x;
                    rhs_v[row] += uv.y;
                }
                None if col < n => triplets.push((row, col, -1.0)),
                None => {}
            }
        }
    }

    (SparseMatrix::from_triplets(n, triplets), rhs_u, rhs_v)
}

#[cfg(feature = "parallel")]
fn solve_pair(
    solver: &ConjugateGradient,
    matrix: &SparseMatrix,
    rhs_u: &DVector<f64>,
    rhs_v: &DVector<f64>,
) -> (SolveResult, SolveResult) {
    rayon::join(|| solver.solve(matrix, rhs_u), || solver.solve(matrix, rhs_v))
}

#[cfg(not(feature = "parallel"))]
fn solve_pair(
    solver: &ConjugateGradient,
    matrix: &SparseMatrix,
    rhs_u: &DVector<f64>,
    rhs_v: &DVector<f64>,
) -> (SolveResult, SolveResult) {
    (solver.solve(matrix, rhs_u), solver.solve(matrix, rhs_v))
}

fn clamp_unit(value: f64, clamped: &mut usize) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        *clamped += 1;
        if value.is_nan() {
            0.5
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

/// Flip and degeneracy counts of the fan triangles under `uv`.
fn quality_metrics(mesh: &Mesh, uv: &[DVec2]) -> EmbeddingMetrics {
    let lookup = |v: VertexId| uv.get(v.index()).copied().unwrap_or(DVec2::ZERO);

    let mut triangles = 0usize;
    let mut flipped = 0usize;
    let mut degenerate_faces = 0usize;
    for face in mesh.faces() {
        let mut degenerate = false;
        for [a, b, c] in face.fan_triangles() {
            let area = triangle_signed_area(lookup(a), lookup(b), lookup(c));
            triangles += 1;
            if area <= 0.0 {
                flipped += 1;
            }
            if near_zero(area, DEGENERATE_AREA_EPSILON) {
                degenerate = true;
            }
        }
        if degenerate {
            degenerate_faces += 1;
        }
    }

    EmbeddingMetrics {
        degenerate_faces,
        flipped_triangles: flipped,
        flipped_fraction: if triangles == 0 {
            0.0
        } else {
            flipped as f64 / triangles as f64
        },
        ..EmbeddingMetrics::default()
    }
}
