//! Circular through-holes.
//!
//! The region is cut in UV: its boundary polygon minus a regular polygon
//! approximating the circle is re-triangulated and lifted back onto the
//! surface through the region's own triangles.

use super::executor::{EditSummary, SkipReason};
use super::polygon::{self, PolygonWithHoles};
use super::HoleParams;
use crate::geometry::{point_in_polygon, triangle_signed_area, UvBox};
use crate::mesh::{Face, Mesh, VertexId, TAG_HOLE_BOUNDARY};
use crate::region::Region;
use crate::spatial::{lift_over_triangles, UvTriangle};
use crate::topology::{extract_region_boundary_loops, OrientationSpace};
use config::constants::{RADIUS_EPSILON, UV_WELD_EPSILON};
use config::settings::KernelConfig;
use glam::{DVec2, DVec3};
use tracing::{debug, warn};

/// Cuts a circular hole into `region`.
///
/// Region faces are replaced by the triangulated remainder; their vertices
/// stay in the arena. Polygon points that coincide with a region vertex
/// reuse it so the patch stays stitched to its surroundings.
pub(crate) fn add_hole(
    mesh: &mut Mesh,
    region: &Region,
    target: &UvBox,
    params: &HoleParams,
    config: &KernelConfig,
) -> Result<EditSummary, SkipReason> {
    if !(params.diameter_mm.is_finite() && params.diameter_mm > 0.0) {
        return Err(SkipReason::unsupported_params(format!(
            "diameter {} mm",
            params.diameter_mm
        )));
    }

    let loops = extract_region_boundary_loops(mesh, &region.faces, OrientationSpace::Uv);
    if loops.is_empty() {
        return Err(SkipReason::NoBoundary);
    }

    let Some(scale) = uv_per_mm(mesh, region) else {
        return Err(SkipReason::DegenerateRegion);
    };
    let offset = params
        .offset_from_region_center_mm
        .map_or(DVec2::ZERO, |o| DVec2::new(o.x, o.y));
    let center = target.center() + offset * scale;
    let radius = 0.5 * params.diameter_mm * scale;

    // Outer loop: the first one enclosing the centre. Other loops inside it
    // are existing holes and stay open.
    let rings: Vec<Vec<DVec2>> = loops.iter().map(|l| l.uv_polygon(mesh)).collect();
    let outer = rings
        .iter()
        .position(|ring| point_in_polygon(center, ring))
        .unwrap_or(0);
    let holes: Vec<Vec<DVec2>> = rings
        .iter()
        .enumerate()
        .filter(|&(i, ring)| i != outer && ring.first().is_some_and(|&p| point_in_polygon(p, &rings[outer])))
        .map(|(_, ring)| ring.clone())
        .collect();

    let subject = PolygonWithHoles::new(rings[outer].clone(), holes);
    let cutter = polygon::circle(center, radius, config.hole_segments);
    let pieces = polygon::difference(&subject, &cutter);
    debug!(
        "Hole r={:.4} (uv) at ({:.4}, {:.4}): {} loops, {} pieces",
        radius,
        center.x,
        center.y,
        loops.len(),
        pieces.len()
    );

    let lift_triangles = region.uv_triangles(mesh);
    // Triangulation is CCW in UV; a region wound the other way gets its new
    // faces reversed to match the surrounding surface.
    let clockwise = lift_triangles
        .iter()
        .map(|t| triangle_signed_area(t.uv[0], t.uv[1], t.uv[2]))
        .sum::<f64>()
        < 0.0;
    let existing: Vec<(VertexId, DVec2)> = region
        .face_vertices(mesh)
        .into_iter()
        .filter_map(|v| Some((v, mesh.uv(v)?)))
        .collect();

    // Resolve every corner before touching the mesh so a failed
    // triangulation or lift leaves it unchanged.
    let CutPlan { pending, triangles } = plan_cut(
        &pieces,
        &existing,
        &lift_triangles,
        clockwise,
        config.containment_epsilon,
    )?;

    let created: Vec<VertexId> = pending
        .into_iter()
        .map(|(uv, xyz)| mesh.add_tagged_vertex(uv, xyz, TAG_HOLE_BOUNDARY))
        .collect();
    let resolve = |corner: Corner| match corner {
        Corner::Existing(id) => id,
        Corner::Created(index) => created[index],
    };
    let new_faces: Vec<Face> = triangles
        .into_iter()
        .map(|[a, b, c]| Face::triangle(resolve(a), resolve(b), resolve(c)))
        .collect();

    let summary = EditSummary {
        removed_faces: region.faces.len(),
        added_faces: new_faces.len(),
        added_vertices: created.len(),
    };
    mesh.replace_faces(&region.faces, new_faces);
    Ok(summary)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Corner {
    Existing(VertexId),
    Created(usize),
}

/// New faces of a cut, with the vertices they still need.
#[derive(Debug, Default)]
struct CutPlan {
    /// UV and world position of each vertex to append
    pending: Vec<(DVec2, DVec3)>,
    triangles: Vec<[Corner; 3]>,
}

/// Triangulates every piece and maps its points onto existing or pending
/// vertices. Any piece that cannot be triangulated or lifted fails the
/// whole cut.
fn plan_cut(
    pieces: &[PolygonWithHoles],
    existing: &[(VertexId, DVec2)],
    lift_triangles: &[UvTriangle],
    clockwise: bool,
    eps: f64,
) -> Result<CutPlan, SkipReason> {
    let mut plan = CutPlan::default();
    for piece in pieces {
        let Some(triangulation) = polygon::triangulate(piece) else {
            return Err(SkipReason::DegenerateRegion);
        };

        let mut corners = Vec::with_capacity(triangulation.points.len());
        for &p in &triangulation.points {
            let corner = if let Some(id) = weld(existing.iter().copied(), p) {
                Corner::Existing(id)
            } else if let Some(index) = weld(plan.pending.iter().map(|&(uv, _)| uv).enumerate(), p) {
                Corner::Created(index)
            } else {
                let Some(xyz) = lift_over_triangles(lift_triangles, p, eps) else {
                    warn!("Could not lift hole vertex at ({:.4}, {:.4})", p.x, p.y);
                    return Err(SkipReason::DegenerateRegion);
                };
                plan.pending.push((p, xyz));
                Corner::Created(plan.pending.len() - 1)
            };
            corners.push(corner);
        }

        plan.triangles.extend(triangulation.triangles.iter().map(|&[a, b, c]| {
            if clockwise {
                [corners[a], corners[c], corners[b]]
            } else {
                [corners[a], corners[b], corners[c]]
            }
        }));
    }
    Ok(plan)
}

/// Isotropic UV-per-millimetre scale of the region: summed UV edge length
/// over summed world edge length.
fn uv_per_mm(mesh: &Mesh, region: &Region) -> Option<f64> {
    let (mut uv_length, mut world_length) = (0.0, 0.0);
    for face in region.faces.iter().filter_map(|&i| mesh.faces().get(i)) {
        for (a, b) in face.edges() {
            if let (Some(ua), Some(ub), Some(pa), Some(pb)) =
                (mesh.uv(a), mesh.uv(b), mesh.position(a), mesh.position(b))
            {
                uv_length += ua.distance(ub);
                world_length += pa.distance(pb);
            }
        }
    }
    (world_length > RADIUS_EPSILON && uv_length > 0.0).then(|| uv_length / world_length)
}

/// First candidate within the weld distance of `p`.
fn weld<K>(candidates: impl IntoIterator<Item = (K, DVec2)>, p: DVec2) -> Option<K> {
    candidates
        .into_iter()
        .find(|(_, uv)| uv.distance_squared(p) <= UV_WELD_EPSILON * UV_WELD_EPSILON)
        .map(|(key, _)| key)
}
