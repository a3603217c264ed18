//! Tests for the UV BVH and the UV→XYZ lift.

use super::*;
use crate::mesh::Face;
use crate::test_support::grid_mesh;
use approx::assert_relative_eq;
use config::settings::KernelConfig;

fn small_leaf_config() -> KernelConfig {
    KernelConfig::new(1e-6, 1e-10, 2000, 4, 10, 64).unwrap()
}

// =============================================================================
// BUILD TESTS
// =============================================================================

#[test]
fn test_build_indexes_every_fan_triangle() {
    let mesh = grid_mesh(8, 8, 8.0, 8.0);
    let bvh = Bvh::build(&mesh, &KernelConfig::default());

    assert_eq!(bvh.triangle_count(), 128);
    assert!(bvh.leaf_count() > 1);
    assert!(bvh.depth() <= 10);
    let root = bvh.root().unwrap();
    assert_relative_eq!(root.bounds().u_min, 0.0);
    assert_relative_eq!(root.bounds().v_max, 1.0);
}

#[test]
fn test_leaves_respect_size_or_depth_cap() {
    fn check(node: &BvhNode, depth: usize, max_depth: usize) {
        match node {
            BvhNode::Leaf { triangles, .. } => {
                assert!(!triangles.is_empty());
                assert!(depth <= max_depth);
            }
            BvhNode::Internal { left, right, bounds } => {
                assert!(bounds.contains(left.bounds().center(), 0.0));
                assert!(bounds.contains(right.bounds().center(), 0.0));
                check(left, depth + 1, max_depth);
                check(right, depth + 1, max_depth);
            }
        }
    }

    let mesh = grid_mesh(16, 4, 16.0, 4.0);
    let bvh = Bvh::build(&mesh, &small_leaf_config());
    check(bvh.root().unwrap(), 0, 10);
}

#[test]
fn test_depth_cap_is_honoured() {
    let mesh = grid_mesh(16, 16, 1.0, 1.0);
    let config = KernelConfig::new(1e-6, 1e-10, 2000, 1, 3, 64).unwrap();
    let bvh = Bvh::build(&mesh, &config);
    assert!(bvh.depth() <= 3);
    assert_eq!(bvh.triangle_count(), 512);
}

#[test]
fn test_faces_without_uv_are_skipped() {
    let mut mesh = grid_mesh(1, 1, 1.0, 1.0);
    let a = mesh.add_vertex(DVec2::new(f64::NAN, 0.0), DVec3::ZERO);
    mesh.add_face(Face::new(vec![a, VertexId::new(0), VertexId::new(1)]));

    let bvh = Bvh::build(&mesh, &KernelConfig::default());
    assert_eq!(bvh.triangle_count(), 2);
}

#[test]
fn test_empty_mesh_has_no_root() {
    let bvh = Bvh::build(&Mesh::new("empty"), &KernelConfig::default());
    assert!(bvh.root().is_none());
    assert!(bvh.query(DVec2::splat(0.5)).is_empty());
    assert!(bvh.lift_uv_to_xyz(DVec2::splat(0.5)).is_none());
}

// =============================================================================
// QUERY AND LIFT TESTS
// =============================================================================

#[test]
fn test_query_matches_linear_scan() {
    let mesh = grid_mesh(10, 6, 10.0, 6.0);
    let bvh = Bvh::build(&mesh, &small_leaf_config());

    for p in [
        DVec2::new(0.05, 0.05),
        DVec2::new(0.51, 0.33),
        DVec2::new(0.99, 0.99),
        DVec2::new(0.3, 0.5),
    ] {
        let mut expected: Vec<usize> = bvh
            .triangles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.contains(p, 1e-6))
            .map(|(i, _)| i)
            .collect();
        let mut found: Vec<usize> = bvh
            .query(p)
            .into_iter()
            .map(|hit| {
                bvh.triangles()
                    .iter()
                    .position(|t| std::ptr::eq(t, hit))
                    .unwrap()
            })
            .collect();
        expected.sort_unstable();
        found.sort_unstable();
        assert_eq!(found, expected, "query mismatch at {p}");
        assert!(!found.is_empty());
    }
}

#[test]
fn test_lift_inside_recovers_position() {
    let mesh = grid_mesh(5, 12, 50.0, 120.0);
    let bvh = Bvh::build(&mesh, &KernelConfig::default());

    let p = bvh.lift_uv_to_xyz(DVec2::new(0.37, 0.81)).unwrap();
    assert_relative_eq!(p.x, 18.5, epsilon = 1e-9);
    assert_relative_eq!(p.y, 97.2, epsilon = 1e-9);
    assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
}

#[test]
fn test_lift_outside_domain_is_none() {
    let mesh = grid_mesh(4, 4, 4.0, 4.0);
    let bvh = Bvh::build(&mesh, &KernelConfig::default());
    assert!(bvh.lift_uv_to_xyz(DVec2::new(1.5, 0.5)).is_none());
    assert!(bvh.lift_uv_to_xyz(DVec2::new(-0.01, 0.5)).is_none());
}

#[test]
fn test_local_lift_falls_back_to_nearest_triangle() {
    let mesh = grid_mesh(2, 2, 2.0, 2.0);
    let triangles = collect_uv_triangles(&mesh, [0, 1]);
    assert_eq!(triangles.len(), 2);

    let inside = lift_over_triangles(&triangles, DVec2::new(0.25, 0.25), 1e-6).unwrap();
    assert_relative_eq!(inside.x, 0.5, epsilon = 1e-12);

    // Just right of the lower-left quad: snapped onto its right edge.
    let outside = lift_over_triangles(&triangles, DVec2::new(0.5 + 1e-4, 0.25), 1e-6).unwrap();
    assert_relative_eq!(outside.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(outside.y, 0.5, epsilon = 1e-9);

    assert!(lift_over_triangles(&[], DVec2::ZERO, 1e-6).is_none());
}

#[test]
fn test_closest_point_on_triangle() {
    let mesh = grid_mesh(1, 1, 1.0, 1.0);
    let triangles = collect_uv_triangles(&mesh, [0]);
    let tri = &triangles[0];

    // Triangle (0,0),(1,0),(1,1).
    assert_eq!(tri.closest_point(DVec2::new(0.9, 0.1)), DVec2::new(0.9, 0.1));
    let q = tri.closest_point(DVec2::new(2.0, 0.5));
    assert_relative_eq!(q.x, 1.0);
    assert_relative_eq!(q.y, 0.5);
}
