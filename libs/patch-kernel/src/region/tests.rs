//! Tests for UV region selection.

use super::*;
use crate::test_support::grid_mesh;
use glam::DVec2;

const EPS: f64 = 1e-6;

#[test]
fn test_unit_box_selects_everything() {
    let mesh = grid_mesh(4, 4, 4.0, 4.0);
    for policy in [SelectionPolicy::FullContainment, SelectionPolicy::PartialOverlap] {
        let region = select_uv_region(&mesh, &UvBox::unit(), policy, EPS);
        assert_eq!(region.vertices.len(), mesh.vertex_count());
        assert_eq!(region.faces, (0..mesh.face_count()).collect::<Vec<_>>());
        assert_eq!(region.triangles.len(), mesh.triangle_count());
    }
}

#[test]
fn test_box_outside_domain_selects_nothing() {
    let mesh = grid_mesh(4, 4, 4.0, 4.0);
    let far = UvBox::new(2.0, 3.0, 2.0, 3.0);
    for policy in [SelectionPolicy::FullContainment, SelectionPolicy::PartialOverlap] {
        let region = select_uv_region(&mesh, &far, policy, EPS);
        assert!(region.is_empty());
        assert!(region.vertices.is_empty());
        assert!(region.triangles.is_empty());
    }
}

#[test]
fn test_inverted_box_selects_nothing() {
    let mesh = grid_mesh(2, 2, 2.0, 2.0);
    let inverted = UvBox::new(0.8, 0.2, 0.0, 1.0);
    let region = select_uv_region(&mesh, &inverted, SelectionPolicy::FullContainment, EPS);
    assert!(region.is_empty());
}

#[test]
fn test_full_containment_is_inclusive() {
    // Box exactly covering the lower-left quad of a 2x2 grid.
    let mesh = grid_mesh(2, 2, 2.0, 2.0);
    let quad = UvBox::new(0.0, 0.5, 0.0, 0.5);
    let region = select_uv_region(&mesh, &quad, SelectionPolicy::FullContainment, EPS);

    assert_eq!(region.faces, vec![0, 1]);
    let expected: BTreeSet<VertexId> = [0, 1, 3, 4].into_iter().map(VertexId::new).collect();
    assert_eq!(region.vertices, expected);
    assert_eq!(region.face_vertices(&mesh).len(), 4);
}

#[test]
fn test_partial_overlap_includes_straddling_faces() {
    let mesh = grid_mesh(2, 2, 2.0, 2.0);
    // Small box in the middle of the lower-left quad: no vertex inside.
    let inner = UvBox::new(0.2, 0.3, 0.1, 0.15);

    let full = select_uv_region(&mesh, &inner, SelectionPolicy::FullContainment, EPS);
    assert!(full.is_empty());

    let partial = select_uv_region(&mesh, &inner, SelectionPolicy::PartialOverlap, EPS);
    assert_eq!(partial.faces, vec![0]);
    assert_eq!(partial.vertices.len(), 3);
}

#[test]
fn test_partial_overlap_tests_every_fan_triangle() {
    let mut mesh = Mesh::new("quad");
    for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        mesh.add_vertex(DVec2::new(u, v), glam::DVec3::new(u, v, 0.0));
    }
    mesh.add_face(Face::from_raw([0, 1, 2, 3]));
    // Upper-left corner: only the second fan triangle (0, 2, 3) reaches it.
    let corner = UvBox::new(0.05, 0.15, 0.85, 0.95);

    let partial = select_uv_region(&mesh, &corner, SelectionPolicy::PartialOverlap, EPS);
    assert_eq!(partial.faces, vec![0]);
    assert_eq!(partial.triangles.len(), 2);
    assert_eq!(partial.vertices.len(), 4);
}

#[test]
fn test_full_containment_keeps_vertices_without_faces() {
    let mesh = grid_mesh(2, 2, 2.0, 2.0);
    // Only the centre vertex lies in the box; no face is fully inside.
    let centre = UvBox::new(0.45, 0.55, 0.45, 0.55);
    let region = select_uv_region(&mesh, &centre, SelectionPolicy::FullContainment, EPS);
    assert!(region.is_empty());
    assert_eq!(region.vertices.len(), 1);
    assert!(region.vertices.contains(&VertexId::new(4)));
}

#[test]
fn test_sat_edge_cases() {
    let b = UvBox::new(0.0, 1.0, 0.0, 1.0);
    let touching = [DVec2::new(1.0, 0.5), DVec2::new(2.0, 0.5), DVec2::new(2.0, 1.5)];
    assert!(triangle_intersects_box(touching, &b, 0.0));

    // Triangle whose bounding box overlaps but whose hypotenuse separates it.
    let diagonal = [DVec2::new(2.0, 0.5), DVec2::new(2.0, 2.0), DVec2::new(0.5, 2.0)];
    assert!(!triangle_intersects_box(diagonal, &b, 0.0));

    let enclosing = [DVec2::new(-5.0, -5.0), DVec2::new(5.0, -5.0), DVec2::new(0.0, 5.0)];
    assert!(triangle_intersects_box(enclosing, &b, 0.0));
}

#[test]
fn test_region_serializes_with_wire_names() {
    let mesh = grid_mesh(1, 1, 1.0, 1.0);
    let region = select_uv_region(&mesh, &UvBox::unit(), SelectionPolicy::FullContainment, EPS);
    let json = serde_json::to_value(&region).unwrap();
    assert_eq!(json["faceIndices"], serde_json::json!([0, 1]));
    assert_eq!(json["vertexIds"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["triangles"][0], serde_json::json!([0, 1, 3]));
}
