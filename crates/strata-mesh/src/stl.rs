//! STL import and export.

use std::io::{Read, Seek, Write};

use stl_io::{Normal, Triangle, Vertex};

use crate::{MeshError, TriangleMesh};

/// Read an ASCII or binary STL into an indexed mesh.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<TriangleMesh, MeshError> {
    let model = stl_io::read_stl(reader)?;

    let mut mesh = TriangleMesh::new();
    mesh.vertices.reserve(model.vertices.len() * 3);
    for v in &model.vertices {
        mesh.vertices
            .extend_from_slice(&[v[0] as f64, v[1] as f64, v[2] as f64]);
    }
    for face in &model.faces {
        mesh.indices.extend(face.vertices.iter().map(|&i| i as u32));
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Write every mesh into one binary STL.
pub fn write_stl<'a, W: Write>(
    writer: &mut W,
    meshes: impl IntoIterator<Item = &'a TriangleMesh>,
) -> Result<(), MeshError> {
    let mut triangles = Vec::new();
    for mesh in meshes {
        for (t, tri) in mesh.triangles().enumerate() {
            let n = mesh.triangle_normal(t);
            let [a, b, c] = tri.map(|i| {
                let p = mesh.vertex(i);
                Vertex::new([p.x as f32, p.y as f32, p.z as f32])
            });
            triangles.push(Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [a, b, c],
            });
        }
    }

    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}
