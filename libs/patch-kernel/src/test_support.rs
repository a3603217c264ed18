//! Mesh fixtures shared by the unit tests.

use crate::mesh::{Face, Mesh};
use glam::{DVec2, DVec3};

/// Flat `width × height` rectangle in the z=0 plane split into
/// `nx × ny` quads (two CCW triangles each), with UV = (x/width, y/height).
pub(crate) fn grid_mesh(nx: usize, ny: usize, width: f64, height: f64) -> Mesh {
    let mut mesh = Mesh::new("grid");
    for j in 0..=ny {
        for i in 0..=nx {
            let u = i as f64 / nx as f64;
            let v = j as f64 / ny as f64;
            mesh.add_vertex(DVec2::new(u, v), DVec3::new(u * width, v * height, 0.0));
        }
    }
    let stride = (nx + 1) as u32;
    for j in 0..ny as u32 {
        for i in 0..nx as u32 {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride + 1;
            let d = a + stride;
            mesh.add_face(Face::from_raw([a, b, c]));
            mesh.add_face(Face::from_raw([a, c, d]));
        }
    }
    mesh
}

/// Two triangles covering the unit square; four boundary edges.
pub(crate) fn two_triangle_square() -> Mesh {
    grid_mesh(1, 1, 1.0, 1.0)
}

/// A closed tetrahedron: every edge is shared by two faces.
pub(crate) fn tetrahedron() -> Mesh {
    let mut mesh = Mesh::new("tetra");
    mesh.add_vertex(DVec2::splat(0.5), DVec3::new(0.0, 0.0, 0.0));
    mesh.add_vertex(DVec2::splat(0.5), DVec3::new(1.0, 0.0, 0.0));
    mesh.add_vertex(DVec2::splat(0.5), DVec3::new(0.0, 1.0, 0.0));
    mesh.add_vertex(DVec2::splat(0.5), DVec3::new(0.0, 0.0, 1.0));
    mesh.add_face(Face::from_raw([0, 2, 1]));
    mesh.add_face(Face::from_raw([0, 1, 3]));
    mesh.add_face(Face::from_raw([1, 2, 3]));
    mesh.add_face(Face::from_raw([2, 0, 3]));
    mesh
}
