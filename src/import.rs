//! This module reads Wavefront .obj files into mesh data the renderer can upload.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use obj::{load_obj, Obj, TexturedVertex};
use thiserror::Error;

use super::mesh::{MeshData, Vertex};

#[derive(Debug, Error)]
/// Things that can go wrong reading a mesh from disk
pub enum ImportError {
    #[error("failed to open mesh file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse obj: {0}")]
    Obj(#[from] obj::ObjError),
}

/// Load a .obj file (with normals and texture coordinates) into mesh data. Vertex colors default
/// to white; tangents are reconstructed from the uv layout.
pub fn load_obj_mesh(path: impl AsRef<Path>) -> Result<MeshData, ImportError> {
    let path = path.as_ref();
    let input = BufReader::new(File::open(path)?);
    let model: Obj<TexturedVertex, u32> = load_obj(input)?;

    let mut vertices: Vec<Vertex> = model
        .vertices
        .iter()
        .map(|v| Vertex {
            position: v.position,
            normal: v.normal,
            uv: [v.texture[0], v.texture[1]],
            tangent: [1.0, 0.0, 0.0, 1.0],
            color: [1.0, 1.0, 1.0],
        })
        .collect();

    compute_tangents(&mut vertices, &model.indices);

    log::debug!(
        "loaded {} ({} vertices, {} triangles)",
        path.display(),
        vertices.len(),
        model.indices.len() / 3
    );

    Ok(MeshData {
        vertices,
        indices: model.indices,
    })
}

/// Reconstruct per-vertex tangents from each triangle's position and uv deltas. Vertices shared
/// between triangles keep the last triangle's tangent, which is fine for the low-poly meshes this
/// loader targets.
fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let v0 = vertices[triangle[0] as usize];
        let v1 = vertices[triangle[1] as usize];
        let v2 = vertices[triangle[2] as usize];

        let pos0 = nalgebra_glm::vec3(v0.position[0], v0.position[1], v0.position[2]);
        let pos1 = nalgebra_glm::vec3(v1.position[0], v1.position[1], v1.position[2]);
        let pos2 = nalgebra_glm::vec3(v2.position[0], v2.position[1], v2.position[2]);

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = nalgebra_glm::vec2(v1.uv[0] - v0.uv[0], v1.uv[1] - v0.uv[1]);
        let delta_uv2 = nalgebra_glm::vec2(v2.uv[0] - v0.uv[0], v2.uv[1] - v0.uv[1]);

        let denom = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if denom.abs() < f32::EPSILON {
            // Degenerate uv mapping; leave the default tangent
            continue;
        }
        let r = 1.0 / denom;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;

        for &index in triangle {
            let vertex = &mut vertices[index as usize];
            let normal = nalgebra_glm::vec3(vertex.normal[0], vertex.normal[1], vertex.normal[2]);
            let sign = if normal.cross(&tangent).dot(&bitangent) < 0.0 {
                -1.0
            } else {
                1.0
            };
            vertex.tangent = [tangent.x, tangent.y, tangent.z, sign];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = load_obj_mesh("does/not/exist.obj");
        assert!(matches!(result, Err(ImportError::Io(_))));
    }

    #[test]
    fn test_tangents_follow_uv_layout() {
        // One triangle in the xy plane with uvs aligned to the axes: the tangent must point
        // along +x.
        let mut vertices = vec![
            Vertex {
                position: [0.0, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [0.0, 0.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                color: [1.0, 1.0, 1.0],
            },
            Vertex {
                position: [1.0, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [1.0, 0.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                color: [1.0, 1.0, 1.0],
            },
            Vertex {
                position: [0.0, 1.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [0.0, 1.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                color: [1.0, 1.0, 1.0],
            },
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);

        for vertex in &vertices {
            assert!((vertex.tangent[0] - 1.0).abs() < 1e-5);
            assert!(vertex.tangent[1].abs() < 1e-5);
            assert!(vertex.tangent[2].abs() < 1e-5);
            assert_eq!(vertex.tangent[3], 1.0);
        }
    }
}
