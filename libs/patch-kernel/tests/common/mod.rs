//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::{DVec2, DVec3};
use patch_kernel::{Face, Mesh};

/// Flat `width × height` mm rectangle at z=0 split into `nx × ny` quads,
/// two counter-clockwise triangles each, with UV proportional to XY.
pub fn rectangle(id: &str, nx: u32, ny: u32, width: f64, height: f64) -> Mesh {
    let mut mesh = Mesh::new(id);
    for j in 0..=ny {
        for i in 0..=nx {
            let (u, v) = (f64::from(i) / f64::from(nx), f64::from(j) / f64::from(ny));
            mesh.add_vertex(DVec2::new(u, v), DVec3::new(u * width, v * height, 0.0));
        }
    }
    let stride = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let a = j * stride + i;
            mesh.add_face(Face::from_raw([a, a + 1, a + stride + 1]));
            mesh.add_face(Face::from_raw([a, a + stride + 1, a + stride]));
        }
    }
    mesh
}

/// Closed tetrahedron.
pub fn tetrahedron() -> Mesh {
    let mut mesh = Mesh::new("tetra");
    for p in [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z] {
        mesh.add_vertex(DVec2::splat(0.5), p);
    }
    for face in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]] {
        mesh.add_face(Face::from_raw(face));
    }
    mesh
}
