//! This module defines meshes: GPU-resident vertex/index buffers plus the bounding sphere the
//! culler tests. A mesh is built once from CPU-side `MeshData` and is immutable afterwards.

use std::ptr::null;

use gl::types::{GLint, GLsizei};

use super::opengl::{check_errors, Buffer};
use super::sphere::BoundingSphere;

/// One vertex, tightly packed the way the shaders expect it:
/// position, normal, uv, tangent with bitangent sign, color.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// xyz = tangent, w = bitangent sign
    pub tangent: [f32; 4],
    pub color: [f32; 3],
}

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();
const VERTEX_STRIDE: GLint = std::mem::size_of::<Vertex>() as GLint;

/// CPU-side mesh data, ready to be uploaded into a `Mesh`
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// A cube spanning -1..1 on each axis, with per-face normals, tangents and uvs
    pub fn cube() -> Self {
        // (normal, tangent) per face; the bitangent is their cross product
        const FACES: [([f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, tangent) in FACES {
            let n = nalgebra_glm::vec3(normal[0], normal[1], normal[2]);
            let t = nalgebra_glm::vec3(tangent[0], tangent[1], tangent[2]);
            let b = n.cross(&t);

            let base = vertices.len() as u32;
            for (u, v) in CORNERS {
                let position = n + t * u + b * v;
                vertices.push(Vertex {
                    position: [position.x, position.y, position.z],
                    normal,
                    uv: [(u + 1.0) * 0.5, (v + 1.0) * 0.5],
                    tangent: [tangent[0], tangent[1], tangent[2], 1.0],
                    color: [1.0, 1.0, 1.0],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self { vertices, indices }
    }

    /// The bounding sphere of this data's vertex positions
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::enclosing(
            self.vertices
                .iter()
                .map(|v| nalgebra_glm::vec3(v.position[0], v.position[1], v.position[2])),
        )
    }
}

/// A mesh uploaded to the GPU. Owns its buffers exclusively, so it moves but never copies, and
/// carries the bounding sphere computed from its vertices at construction.
pub struct Mesh {
    vertex_buffer: Buffer<Vertex>,
    index_buffer: Buffer<u32>,
    index_count: usize,
    bounding_sphere: BoundingSphere,
}

impl Mesh {
    /// Upload mesh data into a new mesh. The bounding sphere is computed here, exactly once.
    pub fn new(data: &MeshData) -> Self {
        let bounding_sphere = data.bounding_sphere();

        let vertex_buffer = Buffer::gen(gl::ARRAY_BUFFER);
        vertex_buffer.set_data(&data.vertices);
        let index_buffer = Buffer::gen(gl::ELEMENT_ARRAY_BUFFER);
        index_buffer.set_data(&data.indices);

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len(),
            bounding_sphere,
        }
    }

    /// The sphere enclosing this mesh's vertices, in local space
    pub fn bounding_sphere(&self) -> BoundingSphere {
        self.bounding_sphere
    }

    /// Bind this mesh's buffers and attribute layout, then submit the indexed triangle draw
    pub fn draw(&self) {
        self.vertex_buffer.bind();
        self.index_buffer.bind();

        unsafe {
            // Vertex position
            gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, VERTEX_STRIDE, null());
            // Vertex normal
            gl::VertexAttribPointer(
                1,
                3,
                gl::FLOAT,
                gl::FALSE,
                VERTEX_STRIDE,
                (3 * FLOAT_SIZE) as *const _,
            );
            // Vertex uv
            gl::VertexAttribPointer(
                2,
                2,
                gl::FLOAT,
                gl::FALSE,
                VERTEX_STRIDE,
                (6 * FLOAT_SIZE) as *const _,
            );
            // Tangent / bitangent sign
            gl::VertexAttribPointer(
                3,
                4,
                gl::FLOAT,
                gl::FALSE,
                VERTEX_STRIDE,
                (8 * FLOAT_SIZE) as *const _,
            );
            // Vertex color
            gl::VertexAttribPointer(
                4,
                3,
                gl::FLOAT,
                gl::FALSE,
                VERTEX_STRIDE,
                (12 * FLOAT_SIZE) as *const _,
            );

            for location in 0..5 {
                gl::EnableVertexAttribArray(location);
            }

            gl::DrawElements(
                gl::TRIANGLES,
                self.index_count as GLsizei,
                gl::UNSIGNED_INT,
                null(),
            );
        }
        check_errors();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 15 * FLOAT_SIZE);
    }

    #[test]
    fn test_cube_shape() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn test_cube_bounding_sphere() {
        let sphere = MeshData::cube().bounding_sphere();
        assert!(nalgebra_glm::length(&sphere.origin) < 1e-6);
        assert!((sphere.radius - 3.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_empty_mesh_data_sphere() {
        let data = MeshData {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        assert!(data.bounding_sphere().is_empty());
    }
}
