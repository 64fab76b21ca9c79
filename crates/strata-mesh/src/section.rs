//! Horizontal plane sections of triangle meshes.

use strata_math::{Point2, Point3};

use crate::TriangleMesh;

/// Distance below which a vertex counts as lying on the cutting plane.
pub const PLANE_EPS: f64 = 1e-9;

/// A line segment in the XY plane.
pub type Segment2 = (Point2, Point2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    On,
    Above,
}

/// Intersect a mesh with the horizontal plane `z`, returning 2D segments.
///
/// Triangles lying in the plane contribute nothing. A triangle edge lying in
/// the plane is reported once, by the triangle whose third vertex is above
/// the plane, so a closed mesh cut exactly at its bottom face yields that
/// face's outline and a cut at its top face yields nothing.
///
/// Crossing points are interpolated from the lower-indexed vertex of each
/// edge, so the two triangles sharing an edge produce identical endpoints.
pub fn intersect_plane(mesh: &TriangleMesh, z: f64) -> Vec<Segment2> {
    let mut segments = Vec::new();

    for tri in mesh.triangles() {
        let pts = tri.map(|i| mesh.vertex(i));
        let d = pts.map(|p| p.z - z);
        let sides = d.map(|d| {
            if d > PLANE_EPS {
                Side::Above
            } else if d < -PLANE_EPS {
                Side::Below
            } else {
                Side::On
            }
        });

        let on: Vec<usize> = (0..3).filter(|&k| sides[k] == Side::On).collect();
        match on.len() {
            // Coplanar triangle.
            3 => {}
            2 => {
                let other = 3 - on[0] - on[1];
                if sides[other] == Side::Above {
                    segments.push((pts[on[0]].xy(), pts[on[1]].xy()));
                }
            }
            1 => {
                let (a, b) = ((on[0] + 1) % 3, (on[0] + 2) % 3);
                if sides[a] != sides[b] {
                    let cross = edge_crossing((tri[a], pts[a], d[a]), (tri[b], pts[b], d[b]));
                    segments.push((pts[on[0]].xy(), cross));
                }
            }
            _ => {
                let mut crossings = Vec::with_capacity(2);
                for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                    if sides[a] != sides[b] {
                        crossings.push(edge_crossing(
                            (tri[a], pts[a], d[a]),
                            (tri[b], pts[b], d[b]),
                        ));
                    }
                }
                if let [p, q] = crossings[..] {
                    segments.push((p, q));
                }
            }
        }
    }

    segments
}

/// Point where the edge `a-b` crosses the plane, in canonical vertex order.
fn edge_crossing(a: (u32, Point3, f64), b: (u32, Point3, f64)) -> Point2 {
    let ((_, p0, d0), (_, p1, d1)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    let t = d0 / (d0 - d1);
    Point2::new(p0.x + t * (p1.x - p0.x), p0.y + t * (p1.y - p0.y))
}
