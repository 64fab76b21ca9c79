//! Planar paths: closed polygons and open polylines.

use strata_math::{cross2, Point2, Tolerance, Vec2};

use crate::error::OffsetDegeneracy;

/// A 2D polygon (closed path).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area of the polygon.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Even-odd point containment test.
    pub fn contains(&self, point: &Point2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &self.points[i];
            let pj = &self.points[j];

            if ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// True if no two non-adjacent edges touch.
    pub fn is_simple(&self) -> bool {
        self.points.len() >= 3 && !self_intersects(&self.points, true)
    }

    /// Copy with duplicate and collinear vertices removed.
    pub fn simplified(&self) -> Self {
        let tol = Tolerance::DEFAULT;
        let mut points: Vec<Point2> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if points.last().map_or(true, |q| !tol.points_equal(p, q)) {
                points.push(*p);
            }
        }
        while points.len() > 1 && tol.points_equal(&points[0], &points[points.len() - 1]) {
            points.pop();
        }

        // Drop vertices whose neighbours are collinear with them until stable.
        let mut changed = true;
        while changed && points.len() >= 3 {
            changed = false;
            let n = points.len();
            for i in 0..n {
                let prev = points[(i + n - 1) % n];
                let next = points[(i + 1) % n];
                let a = points[i] - prev;
                let b = next - points[i];
                if cross2(&a, &b).abs() <= tol.linear * (a.norm() + b.norm()) && a.dot(&b) > 0.0 {
                    points.remove(i);
                    changed = true;
                    break;
                }
            }
        }
        Self::new(points)
    }

    /// Offset every edge by `distance` along its outward normal.
    ///
    /// Negative distances shrink the enclosed region, positive ones grow it,
    /// whatever the winding. Edges that vanish are dropped and their
    /// neighbours re-joined; the offset is degenerate when fewer than three
    /// edges survive, the winding flips, or the result crosses itself.
    pub fn offset(&self, distance: f64) -> Result<Self, OffsetDegeneracy> {
        let tol = Tolerance::DEFAULT;
        let base = self.simplified();
        let area = base.signed_area();
        if base.len() < 3 || area.abs() < tol.area {
            return Err(OffsetDegeneracy::Collapsed);
        }
        if distance == 0.0 {
            return Ok(base);
        }

        let sign = if base.is_ccw() { 1.0 } else { -1.0 };
        let n = base.len();
        let mut edges: Vec<OffsetEdge> = (0..n)
            .map(|i| {
                let p = base.points[i];
                let dir = (base.points[(i + 1) % n] - p).normalize();
                let outward = Vec2::new(dir.y, -dir.x) * sign;
                OffsetEdge {
                    origin: p + outward * distance,
                    dir,
                }
            })
            .collect();

        let points = loop {
            if edges.len() < 3 {
                return Err(OffsetDegeneracy::Collapsed);
            }
            let m = edges.len();
            let mut points = Vec::with_capacity(m);
            for k in 0..m {
                points.push(edges[(k + m - 1) % m].join(&edges[k])?);
            }

            // Edge k runs from vertex k to vertex k + 1.
            let keep: Vec<bool> = (0..m)
                .map(|k| (points[(k + 1) % m] - points[k]).dot(&edges[k].dir) > tol.linear)
                .collect();
            if keep.iter().all(|&k| k) {
                break points;
            }
            let mut keep = keep.into_iter();
            edges.retain(|_| keep.next().unwrap_or(false));
        };

        let result = Self::new(points);
        let result_area = result.signed_area();
        if result_area.abs() < tol.area || result_area.signum() != sign {
            return Err(OffsetDegeneracy::Collapsed);
        }
        if !result.is_simple() {
            return Err(OffsetDegeneracy::SelfIntersecting);
        }
        Ok(result)
    }
}

/// An offset edge line: a point on it and its unit direction.
#[derive(Debug, Clone, Copy)]
struct OffsetEdge {
    origin: Point2,
    dir: Vec2,
}

impl OffsetEdge {
    /// Corner where this edge's line meets the following edge's line.
    fn join(&self, next: &OffsetEdge) -> Result<Point2, OffsetDegeneracy> {
        let denom = cross2(&self.dir, &next.dir);
        if denom.abs() < 1e-12 {
            // Parallel neighbours only survive when they continue straight on.
            return if self.dir.dot(&next.dir) > 0.0 {
                Ok(next.origin)
            } else {
                Err(OffsetDegeneracy::Collapsed)
            };
        }
        let t = cross2(&(next.origin - self.origin), &next.dir) / denom;
        Ok(self.origin + self.dir * t)
    }
}

/// An open polyline (non-closed path).
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Points along the path.
    pub points: Vec<Point2>,
}

impl Polyline {
    /// Create a new polyline.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Total length of the polyline.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// True if no two non-adjacent segments touch.
    pub fn is_simple(&self) -> bool {
        !self_intersects(&self.points, false)
    }
}

/// Check a point chain for touching or crossing non-adjacent segments.
fn self_intersects(points: &[Point2], closed: bool) -> bool {
    let n = points.len();
    let segs = if closed { n } else { n.saturating_sub(1) };
    for i in 0..segs {
        for j in (i + 2)..segs {
            if closed && i == 0 && j == n - 1 {
                continue;
            }
            let (a, b) = (points[i], points[(i + 1) % n]);
            let (c, d) = (points[j], points[(j + 1) % n]);
            if segments_touch(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn segments_touch(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    const EPS: f64 = 1e-12;
    let d1 = cross2(&(d - c), &(a - c));
    let d2 = cross2(&(d - c), &(b - c));
    let d3 = cross2(&(b - a), &(c - a));
    let d4 = cross2(&(b - a), &(d - a));

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }

    let on_segment = |p: Point2, q: Point2, r: Point2| {
        r.x >= p.x.min(q.x) - EPS
            && r.x <= p.x.max(q.x) + EPS
            && r.y >= p.y.min(q.y) - EPS
            && r.y <= p.y.max(q.y) + EPS
    };
    (d1.abs() <= EPS && on_segment(c, d, a))
        || (d2.abs() <= EPS && on_segment(c, d, b))
        || (d3.abs() <= EPS && on_segment(a, b, c))
        || (d4.abs() <= EPS && on_segment(a, b, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ])
    }

    #[test]
    fn test_polygon_area() {
        let square = square(1.0);
        assert_relative_eq!(square.signed_area(), 1.0);
        assert!(square.is_ccw());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = square(10.0);
        assert!(square.contains(&Point2::new(5.0, 5.0)));
        assert!(!square.contains(&Point2::new(15.0, 5.0)));
        assert!(!square.contains(&Point2::new(-1.0, 5.0)));
    }

    #[test]
    fn test_simplified_drops_collinear_points() {
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ]);
        let simple = poly.simplified();
        assert_eq!(simple.len(), 4);
        assert_relative_eq!(simple.signed_area(), 100.0);
    }

    #[test]
    fn test_offset_inward() {
        let offset = square(10.0).offset(-1.0).unwrap();
        assert_eq!(offset.len(), 4);
        assert_relative_eq!(offset.signed_area(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_ignores_winding() {
        let mut cw = square(10.0);
        cw.reverse();
        let offset = cw.offset(-1.0).unwrap();
        assert_relative_eq!(offset.signed_area(), -64.0, epsilon = 1e-9);

        let grown = cw.offset(1.0).unwrap();
        assert_relative_eq!(grown.signed_area(), -144.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_beyond_inscribed_radius_collapses() {
        assert_eq!(square(1.0).offset(-0.6), Err(OffsetDegeneracy::Collapsed));
        assert_eq!(square(1.0).offset(-0.5), Err(OffsetDegeneracy::Collapsed));
        assert!(square(1.0).offset(-0.49).is_ok());
    }

    #[test]
    fn test_offset_thin_rectangle_collapses() {
        let rect = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 0.2),
            Point2::new(0.0, 0.2),
        ]);
        assert!(rect.offset(-0.05).is_ok());
        assert_eq!(rect.offset(-0.15), Err(OffsetDegeneracy::Collapsed));
    }

    #[test]
    fn test_offset_drops_vanishing_edge() {
        // Pentagon with a short edge that disappears before the shape does.
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 6.0),
            Point2::new(5.5, 10.0),
            Point2::new(4.5, 10.0),
            Point2::new(0.0, 6.0),
        ]);
        let offset = poly.offset(-2.0).unwrap();
        assert!(offset.len() < poly.len());
        assert!(offset.is_simple());
        assert!(poly.contains(&offset.points[0]));
    }

    #[test]
    fn test_self_intersection() {
        let bowtie = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ]);
        assert!(!bowtie.is_simple());
        assert!(square(1.0).is_simple());

        let zigzag = Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(5.0, -5.0),
        ]);
        assert!(!zigzag.is_simple());
        assert_relative_eq!(
            Polyline::new(vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)]).length(),
            5.0
        );
    }
}
