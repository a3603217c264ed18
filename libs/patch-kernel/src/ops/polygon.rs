//! 2D polygon glue: boolean difference via `geo`, triangulation via
//! `earcutr`.
//!
//! Rings are stored open (no repeated closing point) on this side of the
//! boundary.

use crate::geometry::triangle_signed_area;
use config::constants::UV_WELD_EPSILON;
use geo::{BooleanOps, Coord, LineString, Polygon};
use glam::DVec2;
use std::f64::consts::TAU;
use tracing::warn;

/// A simple polygon with optional holes, in UV.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct PolygonWithHoles {
    pub exterior: Vec<DVec2>,
    pub holes: Vec<Vec<DVec2>>,
}

impl PolygonWithHoles {
    pub fn new(exterior: Vec<DVec2>, holes: Vec<Vec<DVec2>>) -> Self {
        Self { exterior, holes }
    }

    fn to_geo(&self) -> Polygon<f64> {
        Polygon::new(
            to_line_string(&self.exterior),
            self.holes.iter().map(|h| to_line_string(h)).collect(),
        )
    }

    fn from_geo(polygon: &Polygon<f64>) -> Self {
        Self {
            exterior: open_ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(open_ring).collect(),
        }
    }
}

/// Triangles over a flat point list.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Triangulation {
    pub points: Vec<DVec2>,
    /// Counter-clockwise index triples into `points`
    pub triangles: Vec<[usize; 3]>,
}

/// Regular counter-clockwise `segments`-gon inscribed in the circle.
pub(crate) fn circle(center: DVec2, radius: f64, segments: usize) -> Vec<DVec2> {
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            center + radius * DVec2::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// `subject − cutter`. May split into several polygons or vanish entirely.
///
/// Subject vertices lying on an output edge are put back into the output,
/// so rings shared with neighbouring geometry keep all their points even
/// when the boolean drops collinear ones.
pub(crate) fn difference(subject: &PolygonWithHoles, cutter: &[DVec2]) -> Vec<PolygonWithHoles> {
    let cutter = Polygon::new(to_line_string(cutter), Vec::new());
    let originals: Vec<DVec2> = subject
        .exterior
        .iter()
        .chain(subject.holes.iter().flatten())
        .copied()
        .collect();

    subject
        .to_geo()
        .difference(&cutter)
        .iter()
        .map(PolygonWithHoles::from_geo)
        .filter(|p| p.exterior.len() >= 3)
        .map(|p| PolygonWithHoles {
            exterior: restore_points(&p.exterior, &originals),
            holes: p.holes.iter().map(|h| restore_points(h, &originals)).collect(),
        })
        .collect()
}

/// Ear-clips a polygon with holes. `None` when earcut rejects the input.
pub(crate) fn triangulate(polygon: &PolygonWithHoles) -> Option<Triangulation> {
    let mut points = polygon.exterior.clone();
    let mut hole_indices = Vec::with_capacity(polygon.holes.len());
    for hole in &polygon.holes {
        hole_indices.push(points.len());
        points.extend_from_slice(hole);
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = match earcutr::earcut(&flat, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(e) => {
            warn!("Triangulation of {}-point polygon failed: {:?}", points.len(), e);
            return None;
        }
    };

    let mut triangles: Vec<[usize; 3]> = indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (t[0], t[1], t[2]);
            if triangle_signed_area(points[a], points[b], points[c]) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect();
    insert_dropped_points(&points, &mut triangles);

    Some(Triangulation { points, triangles })
}

/// Earcut filters collinear ring points. Each point no triangle uses is
/// put back by splitting the triangle whose edge it lies on, so the result
/// conforms to every input ring vertex.
fn insert_dropped_points(points: &[DVec2], triangles: &mut Vec<[usize; 3]>) {
    let mut used = vec![false; points.len()];
    for &i in triangles.iter().flatten() {
        used[i] = true;
    }

    for p in (0..points.len()).filter(|&i| !used[i]) {
        let hit = triangles.iter().enumerate().find_map(|(t, tri)| {
            (0..3)
                .find(|&k| on_segment(points[p], points[tri[k]], points[tri[(k + 1) % 3]]))
                .map(|k| (t, k))
        });
        let Some((t, k)) = hit else {
            warn!("Dropped polygon point {} is not on any triangle edge", p);
            continue;
        };
        let [x, y, z] = [triangles[t][k], triangles[t][(k + 1) % 3], triangles[t][(k + 2) % 3]];
        triangles[t] = [x, p, z];
        triangles.push([p, y, z]);
    }
}

/// Strictly between `a` and `b`, within the weld distance of the segment.
fn on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= UV_WELD_EPSILON * UV_WELD_EPSILON {
        return false;
    }
    let t = (p - a).dot(ab) / len2;
    t > 0.0 && t < 1.0 && (a + ab * t).distance_squared(p) <= UV_WELD_EPSILON * UV_WELD_EPSILON
}

/// Re-inserts `originals` that sit strictly inside an edge of `ring`.
fn restore_points(ring: &[DVec2], originals: &[DVec2]) -> Vec<DVec2> {
    let n = ring.len();
    let mut restored = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        restored.push(a);

        let ab = b - a;
        let len2 = ab.length_squared();
        if len2 <= UV_WELD_EPSILON * UV_WELD_EPSILON {
            continue;
        }
        let mut on_edge: Vec<(f64, DVec2)> = originals
            .iter()
            .filter_map(|&p| {
                let t = (p - a).dot(ab) / len2;
                let inside = t > 0.0 && t < 1.0;
                let near = (a + ab * t).distance_squared(p) <= UV_WELD_EPSILON * UV_WELD_EPSILON;
                let distinct = p.distance_squared(a) > UV_WELD_EPSILON * UV_WELD_EPSILON
                    && p.distance_squared(b) > UV_WELD_EPSILON * UV_WELD_EPSILON;
                (inside && near && distinct).then_some((t, p))
            })
            .collect();
        on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));
        on_edge.dedup_by(|x, y| x.1.distance_squared(y.1) <= UV_WELD_EPSILON * UV_WELD_EPSILON);
        restored.extend(on_edge.into_iter().map(|(_, p)| p));
    }
    restored
}

fn to_line_string(ring: &[DVec2]) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    )
}

fn open_ring(ring: &LineString<f64>) -> Vec<DVec2> {
    let mut points: Vec<DVec2> = ring.coords().map(|c| DVec2::new(c.x, c.y)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}
