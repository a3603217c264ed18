mod common;

use approx::assert_relative_eq;
use common::{rectangle, tetrahedron};
use glam::{DVec2, DVec3};
use patch_kernel::geometry::signed_area;
use patch_kernel::topology::{extract_boundary_loops, LoopDefect, OrientationSpace};
use patch_kernel::{
    execute_operations, parametrize, select_uv_region, validate_edge_loop, AdjacencyMap, Bvh,
    Direction, ExecutorConfig, ExtrudeParams, HoleParams, KernelConfig, Mesh, Operation,
    OperationKind, SelectionPolicy, UvBox, VertexId, TAG_EXTRUDE_TOP,
};

const EPS: f64 = 1e-6;

fn ids(raw: &[u32]) -> Vec<VertexId> {
    raw.iter().copied().map(VertexId::new).collect()
}

#[test]
fn parametrizer_covers_every_vertex_in_unit_square() {
    let flat = rectangle("panel", 7, 3, 70.0, 30.0);
    // Same connectivity, bent out of plane, with no usable input UV.
    let mut bent = Mesh::new("bent");
    for v in flat.vertices() {
        let x = v.position.x;
        bent.add_vertex(DVec2::ZERO, DVec3::new(x, v.position.y, 0.01 * x * x));
    }
    for face in flat.faces() {
        bent.add_face(face.clone());
    }

    for mesh in [&flat, &bent] {
        let embedding = parametrize(mesh, &KernelConfig::default());
        assert_eq!(embedding.uv.len(), mesh.vertex_count());
        for uv in &embedding.uv {
            assert!((0.0..=1.0).contains(&uv.x), "u out of range: {}", uv.x);
            assert!((0.0..=1.0).contains(&uv.y), "v out of range: {}", uv.y);
        }
    }
}

#[test]
fn convex_rectangle_parametrizes_without_flips() {
    let mesh = rectangle("plate", 6, 12, 50.0, 120.0);
    let embedding = parametrize(&mesh, &KernelConfig::default());

    let metrics = embedding.metrics;
    assert!(metrics.converged);
    assert!(metrics.residual_norm < 1e-6);
    assert!(metrics.iterations_u <= 2000 && metrics.iterations_v <= 2000);
    assert_eq!(metrics.flipped_triangles, 0);
    assert_eq!(metrics.degenerate_faces, 0);
}

#[test]
fn closed_mesh_has_no_boundary_loops() {
    assert!(extract_boundary_loops(&tetrahedron(), OrientationSpace::Xy).is_empty());
}

#[test]
fn two_triangle_patch_has_one_ccw_loop() {
    let mesh = rectangle("quad", 1, 1, 1.0, 1.0);
    let loops = extract_boundary_loops(&mesh, OrientationSpace::Uv);

    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 4);
    assert!(signed_area(&loops[0].uv_polygon(&mesh)) > 0.0);
}

#[test]
fn unit_box_selects_whole_patch() {
    let mesh = rectangle("plate", 4, 6, 40.0, 60.0);
    let region = select_uv_region(&mesh, &UvBox::unit(), SelectionPolicy::FullContainment, EPS);

    assert_eq!(region.vertices.len(), mesh.vertex_count());
    assert_eq!(region.faces.len(), mesh.face_count());
}

#[test]
fn box_outside_domain_selects_nothing() {
    let mesh = rectangle("plate", 4, 6, 40.0, 60.0);
    let outside = UvBox::new(1.5, 2.0, -3.0, -2.0);
    let region = select_uv_region(&mesh, &outside, SelectionPolicy::PartialOverlap, EPS);

    assert!(region.vertices.is_empty());
    assert!(region.faces.is_empty());
    assert!(region.triangles.is_empty());
}

#[test]
fn hole_in_rectangle_grows_mesh() {
    let mesh = rectangle("plate", 5, 12, 50.0, 120.0);
    let hole = Operation::new(
        "h",
        UvBox::new(0.3, 0.7, 0.3, 0.7),
        OperationKind::AddHole(HoleParams::circular(10.0)),
    );
    let out = execute_operations(&mesh, &[hole], &ExecutorConfig::default()).unwrap();

    assert_eq!(out.report.applied, vec!["h".to_string()]);
    assert!(out.mesh.vertex_count() > mesh.vertex_count());
    assert!(out.mesh.face_count() > mesh.face_count());
    assert_eq!(out.mesh.id(), "plate|ops");
}

#[test]
fn empty_operation_list_is_a_detached_clone() {
    let mesh = rectangle("plate", 3, 3, 30.0, 30.0);
    let mut out = execute_operations(&mesh, &[], &ExecutorConfig::default()).unwrap();

    assert_eq!(out.mesh.vertex_count(), mesh.vertex_count());
    assert_eq!(out.mesh.face_count(), mesh.face_count());

    out.mesh.add_vertex(DVec2::ZERO, DVec3::ZERO);
    out.mesh.set_uv(VertexId::new(0), DVec2::ONE);
    assert_eq!(mesh.vertex_count(), 16);
    assert_eq!(mesh.vertices()[0].uv, DVec2::ZERO);
}

#[test]
fn extrusion_offsets_top_by_height() {
    let mesh = rectangle("plate", 4, 4, 40.0, 40.0);
    for (direction, axis) in [
        (Direction::PosX, DVec3::X),
        (Direction::NegY, DVec3::NEG_Y),
        (Direction::PosZ, DVec3::Z),
    ] {
        let op = Operation::new(
            "e",
            UvBox::new(0.2, 0.8, 0.2, 0.8),
            OperationKind::ExtrudeRegion(ExtrudeParams::solid(direction, 7.5)),
        );
        let out = execute_operations(&mesh, &[op], &ExecutorConfig::default()).unwrap();

        let tops: Vec<_> = out
            .mesh
            .vertices()
            .iter()
            .filter(|v| v.has_tag(TAG_EXTRUDE_TOP))
            .collect();
        assert_eq!(tops.len(), 9);
        for top in tops {
            let base = mesh.vertices().iter().find(|v| v.uv == top.uv).unwrap();
            let offset = top.position - base.position;
            assert_relative_eq!(offset.dot(axis), 7.5, epsilon = 1e-9);
            assert_relative_eq!((offset - axis * 7.5).length(), 0.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn bvh_lift_inside_and_outside() {
    let mesh = rectangle("plate", 5, 12, 50.0, 120.0);
    let bvh = Bvh::build(&mesh, &KernelConfig::default());

    assert!(bvh.lift_uv_to_xyz(DVec2::new(1.5, 0.5)).is_none());
    assert!(bvh.lift_uv_to_xyz(DVec2::new(-0.1, -0.1)).is_none());

    // Corners of face 0 are (0,0), (10,0), (10,10) mm at UV (0,0), (0.2,0), (0.2,1/12).
    let (a, b, c) = (DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), DVec3::new(10.0, 10.0, 0.0));
    let weights = DVec3::new(0.5, 0.3, 0.2);
    let uv = DVec2::ZERO * weights.x
        + DVec2::new(0.2, 0.0) * weights.y
        + DVec2::new(0.2, 1.0 / 12.0) * weights.z;
    let lifted = bvh.lift_uv_to_xyz(uv).unwrap();
    let expected = a * weights.x + b * weights.y + c * weights.z;
    assert_relative_eq!(lifted.x, expected.x, epsilon = 1e-9);
    assert_relative_eq!(lifted.y, expected.y, epsilon = 1e-9);
    assert_relative_eq!(lifted.z, expected.z, epsilon = 1e-9);
}

#[test]
fn edge_loop_validation() {
    // 2x1 grid: vertices 0..=2 bottom, 3..=5 top.
    let mesh = rectangle("strip", 2, 1, 2.0, 1.0);
    let adjacency = AdjacencyMap::build(&mesh);

    let short = validate_edge_loop(&adjacency, &ids(&[0, 1]));
    assert_eq!(short.reason, Some(LoopDefect::TooShort { len: 2 }));

    let gap = validate_edge_loop(&adjacency, &ids(&[0, 2, 5, 3]));
    assert!(matches!(gap.reason, Some(LoopDefect::NonAdjacent { .. })));

    let repeated = validate_edge_loop(&adjacency, &ids(&[0, 1, 4, 1, 0]));
    assert!(matches!(repeated.reason, Some(LoopDefect::DuplicateVertex { .. })));

    let open = validate_edge_loop(&adjacency, &ids(&[0, 1, 2, 5]));
    assert!(matches!(open.reason, Some(LoopDefect::Unclosed { .. })));

    let border = validate_edge_loop(&adjacency, &ids(&[0, 1, 2, 5, 4, 3, 0]));
    assert!(border.valid);
    assert!(border.reason.is_none());
}
