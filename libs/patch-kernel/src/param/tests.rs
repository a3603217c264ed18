//! Tests for the sparse solver and the harmonic parametrizer.

use super::*;
use crate::mesh::Face;
use crate::test_support::{grid_mesh, tetrahedron, two_triangle_square};
use approx::assert_relative_eq;
use glam::{DQuat, DVec3};
use nalgebra::DVector;

fn in_unit_square(uv: DVec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

// =============================================================================
// SPARSE MATRIX TESTS
// =============================================================================

#[test]
fn test_triplets_sum_duplicates_and_drop_out_of_range() {
    let m = SparseMatrix::from_triplets(
        3,
        [(2, 1, 1.0), (0, 0, 2.0), (2, 1, 0.5), (3, 0, 9.0), (1, 1, 4.0)],
    );
    assert_eq!(m.dim(), 3);
    assert_eq!(m.nnz(), 3);
    assert_relative_eq!(m.get(2, 1), 1.5);
    assert_relative_eq!(m.get(1, 2), 0.0);
    assert_eq!(m.diagonal(), DVector::from_vec(vec![2.0, 4.0, 0.0]));
}

#[test]
fn test_mul_vec() {
    let m = SparseMatrix::from_triplets(
        2,
        [(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)],
    );
    assert_eq!(
        m.mul_vec(&DVector::from_vec(vec![1.0, 2.0])),
        DVector::from_vec(vec![0.0, 3.0])
    );
    assert!(m.is_symmetric(0.0));
    assert_eq!(m.as_csr().nnz(), 4);
}

#[test]
fn test_assembled_laplacian_is_symmetric() {
    let mesh = grid_mesh(4, 4, 4.0, 4.0);
    let adjacency = AdjacencyMap::build(&mesh);
    let pinned: Vec<Option<DVec2>> = mesh
        .vertices()
        .iter()
        .map(|v| (adjacency.degree(v.id) < 6).then_some(v.uv))
        .collect();

    let (matrix, rhs_u, rhs_v) = assemble_laplacian(&adjacency, &pinned);
    assert_eq!(matrix.dim(), 25);
    assert!(matrix.is_symmetric(0.0));
    assert_eq!(rhs_u.len(), 25);
    // Interior vertex 6 has pinned neighbours 0, 1 and 5.
    assert_relative_eq!(rhs_u[6], 0.25);
    assert_relative_eq!(rhs_v[6], 0.25);
    assert_relative_eq!(matrix.get(6, 6), 6.0);
    assert_relative_eq!(matrix.get(6, 1), 0.0);
    assert_relative_eq!(matrix.get(6, 7), -1.0);
}

// =============================================================================
// SOLVER TESTS
// =============================================================================

#[test]
fn test_cg_zero_rhs_converges_immediately() {
    let m = SparseMatrix::from_triplets(2, [(0, 0, 1.0), (1, 1, 1.0)]);
    let result = ConjugateGradient::default().solve(&m, &DVector::zeros(2));
    assert!(result.converged);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.solution, DVector::zeros(2));
}

#[test]
fn test_cg_solves_tridiagonal_system() {
    // 1D Poisson: -x_{i-1} + 2x_i - x_{i+1} = 1 with zero ends.
    let n = 20;
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.0));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, -1.0));
        }
    }
    let m = SparseMatrix::from_triplets(n, triplets);
    let b = DVector::from_element(n, 1.0);

    let result = ConjugateGradient::new(SolverConfig::default()).solve(&m, &b);
    assert!(result.converged);
    assert!(result.iterations <= 2 * n);
    assert!(result.residual_norm <= 1e-10);

    let ax = m.mul_vec(&result.solution);
    for (lhs, rhs) in ax.iter().zip(&b) {
        assert_relative_eq!(*lhs, *rhs, epsilon = 1e-8);
    }
}

#[test]
fn test_cg_reports_iteration_cap() {
    let n = 50;
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.0));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
            triplets.push((i - 1, i, -1.0));
        }
    }
    let m = SparseMatrix::from_triplets(n, triplets);
    let config = SolverConfig {
        max_iterations: 2,
        tolerance: 1e-12,
    };
    let result = ConjugateGradient::new(config).solve(&m, &DVector::from_element(n, 1.0));
    assert!(!result.converged);
    assert_eq!(result.iterations, 2);
    assert!(result.residual_norm > 1e-12);
}

// =============================================================================
// PARAMETRIZER TESTS
// =============================================================================

#[test]
fn test_grid_embedding_is_valid() {
    let mesh = grid_mesh(6, 10, 50.0, 120.0);
    let embedding = parametrize(&mesh, &KernelConfig::default());

    assert_eq!(embedding.uv.len(), mesh.vertex_count());
    assert!(embedding.metrics.converged);
    assert!(embedding.metrics.residual_norm < 1e-6);
    assert_eq!(embedding.metrics.flipped_triangles, 0);
    assert_eq!(embedding.metrics.flipped_fraction, 0.0);
    assert_eq!(embedding.metrics.degenerate_faces, 0);
    assert!(embedding.uv.iter().all(|&uv| in_unit_square(uv)));
}

#[test]
fn test_boundary_lands_on_circle() {
    let mesh = grid_mesh(4, 4, 10.0, 10.0);
    let embedding = parametrize(&mesh, &KernelConfig::default());
    let loops = extract_boundary_loops(&mesh, OrientationSpace::Xy);

    for &v in loops[0].vertices() {
        let uv = embedding.get(v).unwrap();
        assert_relative_eq!(uv.distance(DVec2::splat(0.5)), 0.5, epsilon = 1e-12);
    }
}

#[test]
fn test_interior_vertex_is_neighbor_average() {
    let mesh = grid_mesh(4, 4, 4.0, 4.0);
    let embedding = parametrize(&mesh, &KernelConfig::default());
    let adjacency = AdjacencyMap::build(&mesh);

    // Vertex (2,2) is the grid centre.
    let centre = VertexId::new(12);
    let neighbors: Vec<DVec2> = adjacency
        .neighbors(centre)
        .map(|n| embedding.get(n).unwrap())
        .collect();
    let mean = neighbors.iter().copied().sum::<DVec2>() / neighbors.len() as f64;
    let uv = embedding.get(centre).unwrap();
    assert_relative_eq!(uv.x, mean.x, epsilon = 1e-8);
    assert_relative_eq!(uv.y, mean.y, epsilon = 1e-8);
}

#[test]
fn test_embedding_ignores_translation_and_rotation() {
    let mesh = grid_mesh(3, 5, 30.0, 50.0);
    let base = parametrize(&mesh, &KernelConfig::default());

    let rotation = DQuat::from_rotation_z(0.7);
    let offset = DVec3::new(100.0, -40.0, 7.5);
    let moved_vertices: Vec<_> = mesh
        .vertices()
        .iter()
        .map(|v| {
            let mut v = v.clone();
            v.position = rotation * v.position + offset;
            v
        })
        .collect();
    let moved = Mesh::from_parts("moved", moved_vertices, mesh.faces().to_vec()).unwrap();
    let embedded = parametrize(&moved, &KernelConfig::default());

    for (a, b) in base.uv.iter().zip(&embedded.uv) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-8);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-8);
    }
}

#[test]
fn test_closed_mesh_keeps_existing_uv() {
    let mut mesh = tetrahedron();
    mesh.set_uv(VertexId::new(1), DVec2::new(0.25, 0.75));
    mesh.set_uv(VertexId::new(2), DVec2::new(f64::NAN, 0.1));

    let embedding = parametrize(&mesh, &KernelConfig::default());
    assert!(embedding.metrics.converged);
    assert_eq!(embedding.metrics.iterations_u, 0);
    assert_eq!(embedding.get(VertexId::new(1)), Some(DVec2::new(0.25, 0.75)));
    assert_eq!(embedding.get(VertexId::new(2)), Some(DVec2::splat(0.5)));
}

#[test]
fn test_orphan_vertex_is_pinned() {
    let mut mesh = two_triangle_square();
    let orphan = mesh.add_vertex(DVec2::new(0.2, 0.9), DVec3::new(5.0, 5.0, 5.0));

    let embedding = parametrize(&mesh, &KernelConfig::default());
    assert_eq!(embedding.get(orphan), Some(DVec2::new(0.2, 0.9)));
    assert!(embedding.metrics.converged);
}

#[test]
fn test_flipped_input_is_counted() {
    // A face wound against its neighbour cannot embed without a flip.
    let mut mesh = two_triangle_square();
    mesh.add_face(Face::from_raw([0, 3, 1]));

    let embedding = parametrize(&mesh, &KernelConfig::default());
    assert!(embedding.metrics.flipped_triangles >= 1);
    assert!(embedding.metrics.flipped_fraction > 0.0);
}

#[test]
fn test_apply_writes_uv_onto_mesh() {
    let mut mesh = grid_mesh(2, 2, 2.0, 2.0);
    let embedding = parametrize(&mesh, &KernelConfig::default());
    embedding.apply_to(&mut mesh);

    for vertex in mesh.vertices() {
        assert_eq!(Some(vertex.uv), embedding.get(vertex.id));
    }

    let rebuilt = grid_mesh(2, 2, 2.0, 2.0).with_embedding(&embedding.uv);
    assert_eq!(rebuilt.vertices(), mesh.vertices());
}
