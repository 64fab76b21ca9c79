#![warn(missing_docs)]

//! Triangle meshes for the strata slicer.
//!
//! Source bodies and generated surfaces are both stored as indexed triangle
//! meshes. This crate provides the mesh type, a few primitive builders,
//! horizontal plane sections and STL import/export.

pub mod section;
pub mod stl;

pub use section::{intersect_plane, Segment2, PLANE_EPS};
pub use stl::{read_stl, write_stl};

use strata_math::{Aabb3, Point2, Point3, Vec3};
use thiserror::Error;

/// Errors produced when building or loading meshes.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The index buffer does not describe whole triangles.
    #[error("index buffer length {0} is not a multiple of 3")]
    NotTriangles(usize),

    /// A triangle references a vertex that does not exist.
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange {
        /// Offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertices: usize,
    },

    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    Empty,

    /// A primitive was given an unusable outline.
    #[error("invalid outline: {0}")]
    InvalidOutline(String),

    /// Reading or writing mesh data failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Indexed triangle mesh with `f64` positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f64>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    pub fn vertex(&self, i: u32) -> Point3 {
        let i = i as usize * 3;
        Point3::new(self.vertices[i], self.vertices[i + 1], self.vertices[i + 2])
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, p: Point3) -> u32 {
        let idx = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&[p.x, p.y, p.z]);
        idx
    }

    /// Append a triangle.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a quad `a -> b -> c -> d` as two triangles.
    pub fn add_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    /// Vertex indices of triangle `t`.
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [
            self.indices[t * 3],
            self.indices[t * 3 + 1],
            self.indices[t * 3 + 2],
        ]
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Unit normal of triangle `t` (zero for degenerate triangles).
    pub fn triangle_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t).map(|i| self.vertex(i));
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vec3::zeros()
        }
    }

    /// Translate every vertex by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        for v in self.vertices.chunks_exact_mut(3) {
            v[0] += delta.x;
            v[1] += delta.y;
            v[2] += delta.z;
        }
    }

    /// Axis-aligned bounds of the vertices referenced by triangles.
    pub fn bounds(&self) -> Option<Aabb3> {
        let used: Vec<Point3> = self.indices.iter().map(|&i| self.vertex(i)).collect();
        Aabb3::from_points(&used)
    }

    /// Check that the index buffer is well formed and non-empty.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(self.indices.len()));
        }
        if self.indices.is_empty() {
            return Err(MeshError::Empty);
        }
        let vertices = self.num_vertices();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(MeshError::IndexOutOfRange { index, vertices });
        }
        Ok(())
    }

    /// Closed prism: `outline` extruded from `z_min` to `z_max`.
    ///
    /// The outline may be given in either winding; caps are fan
    /// triangulated, so they are only exact for convex outlines.
    pub fn prism(outline: &[Point2], z_min: f64, z_max: f64) -> Result<Self, MeshError> {
        let ring = ccw_ring(outline)?;
        if z_max <= z_min {
            return Err(MeshError::InvalidOutline(format!(
                "prism height must be positive, got {z_min}..{z_max}"
            )));
        }

        let n = ring.len() as u32;
        let mut mesh = Self::new();
        for p in &ring {
            mesh.add_vertex(Point3::new(p.x, p.y, z_min));
        }
        for p in &ring {
            mesh.add_vertex(Point3::new(p.x, p.y, z_max));
        }

        for a in 0..n {
            let b = (a + 1) % n;
            mesh.add_quad(a, b, n + b, n + a);
        }
        for i in 1..n - 1 {
            mesh.add_triangle(0, i + 1, i);
            mesh.add_triangle(n, n + i, n + i + 1);
        }
        Ok(mesh)
    }

    /// Closed box spanning `min..max`.
    pub fn cuboid(min: Point3, max: Point3) -> Result<Self, MeshError> {
        let outline = [
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ];
        Self::prism(&outline, min.z, max.z)
    }

    /// Closed tube: the region between `outer` and `inner`, extruded.
    ///
    /// Both rings must have the same vertex count; vertex `i` of the inner
    /// ring is joined to vertex `i` of the outer ring on the caps.
    pub fn tube(
        outer: &[Point2],
        inner: &[Point2],
        z_min: f64,
        z_max: f64,
    ) -> Result<Self, MeshError> {
        let outer = ccw_ring(outer)?;
        let inner = ccw_ring(inner)?;
        if outer.len() != inner.len() {
            return Err(MeshError::InvalidOutline(format!(
                "tube rings differ in length: {} vs {}",
                outer.len(),
                inner.len()
            )));
        }
        if z_max <= z_min {
            return Err(MeshError::InvalidOutline(format!(
                "tube height must be positive, got {z_min}..{z_max}"
            )));
        }

        let n = outer.len() as u32;
        let mut mesh = Self::new();
        for ring in [&outer, &inner] {
            for p in ring.iter() {
                mesh.add_vertex(Point3::new(p.x, p.y, z_min));
            }
            for p in ring.iter() {
                mesh.add_vertex(Point3::new(p.x, p.y, z_max));
            }
        }
        let (ob, ot, ib, it) = (0, n, 2 * n, 3 * n);

        for a in 0..n {
            let b = (a + 1) % n;
            // Outer wall faces away from the axis, inner wall towards it.
            mesh.add_quad(ob + a, ob + b, ot + b, ot + a);
            mesh.add_quad(ib + a, it + a, it + b, ib + b);
            mesh.add_quad(ob + a, ib + a, ib + b, ob + b);
            mesh.add_quad(ot + a, ot + b, it + b, it + a);
        }
        Ok(mesh)
    }
}

fn ccw_ring(outline: &[Point2]) -> Result<Vec<Point2>, MeshError> {
    if outline.len() < 3 {
        return Err(MeshError::InvalidOutline(format!(
            "need at least 3 points, got {}",
            outline.len()
        )));
    }
    let n = outline.len();
    let area: f64 = (0..n)
        .map(|i| {
            let (p, q) = (outline[i], outline[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
        / 2.0;
    if area.abs() < 1e-12 {
        return Err(MeshError::InvalidOutline("outline has zero area".into()));
    }

    let mut ring = outline.to_vec();
    if area < 0.0 {
        ring.reverse();
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_cuboid_counts_and_bounds() {
        let mesh = TriangleMesh::cuboid(Point3::origin(), Point3::new(10.0, 5.0, 2.0)).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_triangles(), 12);
        mesh.validate().unwrap();

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point3::origin());
        assert_eq!(bounds.max, Point3::new(10.0, 5.0, 2.0));
    }

    #[test]
    fn test_prism_side_normals_point_outward() {
        let mesh = TriangleMesh::prism(&square(2.0), 0.0, 1.0).unwrap();
        // First side quad spans the y = 0 edge, so its normal is -Y.
        let n = mesh.triangle_normal(0);
        assert_relative_eq!(n.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_prism_accepts_cw_outline() {
        let mut outline = square(1.0);
        outline.reverse();
        let mesh = TriangleMesh::prism(&outline, 0.0, 1.0).unwrap();
        let n = mesh.triangle_normal(0);
        assert!(n.z.abs() < 1e-12);
        assert!(n.x.abs() + n.y.abs() > 0.99);
    }

    #[test]
    fn test_prism_rejects_bad_input() {
        assert!(matches!(
            TriangleMesh::prism(&square(1.0)[..2], 0.0, 1.0),
            Err(MeshError::InvalidOutline(_))
        ));
        assert!(matches!(
            TriangleMesh::prism(&square(1.0), 1.0, 1.0),
            Err(MeshError::InvalidOutline(_))
        ));
    }

    #[test]
    fn test_tube_counts() {
        let outer = square(10.0);
        let inner: Vec<Point2> = square(4.0)
            .iter()
            .map(|p| Point2::new(p.x + 3.0, p.y + 3.0))
            .collect();
        let mesh = TriangleMesh::tube(&outer, &inner, 0.0, 2.0).unwrap();
        assert_eq!(mesh.num_vertices(), 16);
        assert_eq!(mesh.num_triangles(), 32);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_validate_errors() {
        let mut mesh = TriangleMesh::new();
        assert!(matches!(mesh.validate(), Err(MeshError::Empty)));

        mesh.add_vertex(Point3::origin());
        mesh.indices = vec![0, 0];
        assert!(matches!(mesh.validate(), Err(MeshError::NotTriangles(2))));

        mesh.indices = vec![0, 0, 7];
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { index: 7, vertices: 1 })
        ));
    }

    #[test]
    fn test_translate() {
        let mut a = TriangleMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
        a.translate(Vec3::new(5.0, 0.0, 0.0));

        assert_eq!(a.num_triangles(), 12);
        let bounds = a.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, 5.0);
        assert_relative_eq!(bounds.max.x, 6.0);
        a.validate().unwrap();
    }
}
