//! Profile extrusion into open surface bodies.

use strata_math::{Point2, Point3};
use strata_mesh::TriangleMesh;

use crate::error::ExtrudeError;
use crate::profile::{ConnectedProfile, ProfilePath};
use crate::sketch::Sketch;

/// Where a surface body came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceKind {
    /// Extruded directly from a section profile.
    Layer,
    /// Offset from a layer surface.
    Offset {
        /// Index of the layer surface in the same component.
        parent: usize,
        /// Contour number, starting at 1.
        contour: u32,
        /// Signed offset distance (negative is towards the material).
        distance: f64,
    },
}

/// A zero-thickness surface extruded upwards from a planar path.
#[derive(Debug, Clone)]
pub struct SurfaceBody {
    /// Display name.
    pub name: String,
    /// Layer index the surface belongs to.
    pub layer: usize,
    /// Height of the path the surface starts from.
    pub z: f64,
    /// Extrusion distance in +Z.
    pub thickness: f64,
    /// Layer surface or offset contour.
    pub kind: SurfaceKind,
    /// True if the path bounds a hole in the material.
    pub hole: bool,
    /// The extruded path.
    pub path: ProfilePath,
    /// Side walls of the surface; never capped.
    pub mesh: TriangleMesh,
}

/// Build the side walls of `points` extruded from `z` to `z + thickness`.
///
/// A closed path gets one quad per edge including the closing edge; an open
/// path gets one quad per segment.
pub fn surface_mesh(points: &[Point2], closed: bool, z: f64, thickness: f64) -> TriangleMesh {
    let n = points.len() as u32;
    let mut mesh = TriangleMesh::new();
    for p in points {
        mesh.add_vertex(Point3::new(p.x, p.y, z));
    }
    for p in points {
        mesh.add_vertex(Point3::new(p.x, p.y, z + thickness));
    }

    let segments = if closed { n } else { n.saturating_sub(1) };
    for a in 0..segments {
        let b = (a + 1) % n;
        mesh.add_quad(a, b, n + b, n + a);
    }
    mesh
}

/// Build the side walls of `path` extruded from `z` to `z + thickness`.
///
/// Branched paths get one quad per segment, each on its own vertices.
pub fn path_mesh(path: &ProfilePath, z: f64, thickness: f64) -> TriangleMesh {
    match path {
        ProfilePath::Closed(polygon) => surface_mesh(&polygon.points, true, z, thickness),
        ProfilePath::Open(polyline) => surface_mesh(&polyline.points, false, z, thickness),
        ProfilePath::Branched(segments) => {
            let mut mesh = TriangleMesh::new();
            for (a, b) in segments {
                let base = mesh.add_vertex(Point3::new(a.x, a.y, z));
                mesh.add_vertex(Point3::new(b.x, b.y, z));
                mesh.add_vertex(Point3::new(b.x, b.y, z + thickness));
                mesh.add_vertex(Point3::new(a.x, a.y, z + thickness));
                mesh.add_quad(base, base + 1, base + 2, base + 3);
            }
            mesh
        }
    }
}

/// Extrude one profile of `sketch` upwards by `thickness`.
pub fn extrude_profile(
    sketch: &Sketch,
    profile: &ConnectedProfile,
    thickness: f64,
) -> Result<(ProfilePath, TriangleMesh), ExtrudeError> {
    if !(thickness > 0.0 && thickness.is_finite()) {
        return Err(ExtrudeError::ZeroThickness(thickness));
    }
    let path = ProfilePath::from_profile(sketch, profile)?;
    if !path.is_simple() {
        return Err(ExtrudeError::SelfIntersecting);
    }
    let mesh = path_mesh(&path, sketch.plane.z, thickness);
    Ok((path, mesh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::partition_profiles;
    use crate::sketch::SketchCurve;
    use crate::sweep::LayerPlane;

    fn sketch_with(points: &[(f64, f64)], closed: bool, z: f64) -> Sketch {
        let mut sketch = Sketch::new(LayerPlane::new(0, z));
        let n = points.len();
        let segments = if closed { n } else { n - 1 };
        for i in 0..segments {
            let (a, b) = (points[i], points[(i + 1) % n]);
            sketch.add_curve(SketchCurve::line(Point2::new(a.0, a.1), Point2::new(b.0, b.1)));
        }
        sketch
    }

    #[test]
    fn test_closed_profile_is_uncapped() {
        let sketch = sketch_with(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], true, 0.5);
        let profiles = partition_profiles(&sketch);
        let (path, mesh) = extrude_profile(&sketch, &profiles[0], 0.25).unwrap();

        assert!(path.is_closed());
        assert_eq!(mesh.num_triangles(), 8);
        for t in 0..mesh.num_triangles() {
            assert!(mesh.triangle_normal(t).z.abs() < 1e-12, "triangle {t} is horizontal");
        }
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min.z, 0.5);
        assert_eq!(bounds.max.z, 0.75);
    }

    #[test]
    fn test_open_profile_extrudes_segments() {
        let sketch = sketch_with(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], false, 0.0);
        let profiles = partition_profiles(&sketch);
        let (path, mesh) = extrude_profile(&sketch, &profiles[0], 0.1).unwrap();

        assert!(!path.is_closed());
        assert_eq!(mesh.num_triangles(), 4);
    }

    #[test]
    fn test_branched_profile_gets_a_quad_per_curve() {
        // A square with a spur leaving the (1, 1) corner.
        let mut sketch = sketch_with(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], true, 0.2);
        sketch.add_curve(SketchCurve::line(Point2::new(1.0, 1.0), Point2::new(2.0, 1.0)));
        let profiles = partition_profiles(&sketch);
        assert_eq!(profiles.len(), 1);

        let (path, mesh) = extrude_profile(&sketch, &profiles[0], 0.1).unwrap();
        assert!(matches!(path, ProfilePath::Branched(_)));
        assert_eq!(mesh.num_triangles(), 10);
        assert!(mesh.validate().is_ok());
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.max.x, 2.0);
        assert_eq!(bounds.min.z, 0.2);
        assert!((bounds.max.z - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_thickness_must_be_positive() {
        let sketch = sketch_with(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], true, 0.0);
        let profiles = partition_profiles(&sketch);
        assert_eq!(
            extrude_profile(&sketch, &profiles[0], 0.0).unwrap_err(),
            ExtrudeError::ZeroThickness(0.0)
        );
    }

    #[test]
    fn test_self_intersecting_loop_is_rejected() {
        // Bow tie: the diagonals cross at (0.5, 0.5) without sharing an endpoint.
        let sketch = sketch_with(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)], true, 0.0);
        let profiles = partition_profiles(&sketch);
        assert_eq!(profiles.len(), 1);
        assert_eq!(
            extrude_profile(&sketch, &profiles[0], 0.1).unwrap_err(),
            ExtrudeError::SelfIntersecting
        );
    }
}
