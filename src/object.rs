//! This module defines scene objects and the per-object render dispatch. A scene object ties a
//! shared mesh and a shared material together with its own model-to-world transform.

use std::rc::Rc;

use super::frustum::Frustum;
use super::material::{Material, PassType, UniformValue, MODEL_MATRIX};
use super::mesh::Mesh;

/// One renderable thing in the scene. Mesh and material are shared handles and either may be
/// absent while a scene is being assembled; such an object simply doesn't render.
pub struct SceneObject {
    mesh: Option<Rc<Mesh>>,
    material: Option<Rc<Material>>,
    transform: nalgebra_glm::Mat4,
}

impl SceneObject {
    /// Create a new scene object. Pass `None` for either handle to leave the object inactive.
    pub fn new(mesh: Option<Rc<Mesh>>, material: Option<Rc<Material>>) -> Self {
        Self {
            mesh,
            material,
            transform: nalgebra_glm::identity(),
        }
    }

    /// Render this object for one pass. A no-op when the object has no mesh or no material.
    ///
    /// The steps always run in the same order and nothing is cached between calls: the depth
    /// mode is re-selected from the pass, and the current transform is re-uploaded, every time.
    pub fn render(&self, pass: PassType) {
        let (Some(mesh), Some(material)) = (&self.mesh, &self.material) else {
            return;
        };

        material.set_depth_test_mode(pass.depth_test_mode());
        material.set_stored_uniform(MODEL_MATRIX, UniformValue::Mat4(self.transform));
        material.bind(pass);
        mesh.draw();
    }

    /// Whether this object's bounding sphere could intersect the frustum. Objects with no mesh
    /// are never visible.
    pub fn within_frustum(&self, frustum: &Frustum) -> bool {
        match &self.mesh {
            Some(mesh) => mesh.bounding_sphere().within_frustum(frustum, &self.transform),
            None => false,
        }
    }

    /// This object's material. Asking for the material of an object that has none is a
    /// scene-assembly bug and panics.
    pub fn material(&self) -> &Material {
        self.material
            .as_deref()
            .expect("scene object has no material")
    }

    /// Set the object's model-to-world transform
    pub fn set_transform(&mut self, transform: nalgebra_glm::Mat4) {
        self.transform = transform;
    }

    /// The object's current model-to-world transform
    pub fn transform(&self) -> &nalgebra_glm::Mat4 {
        &self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::DepthTestMode;
    use crate::opengl::Program;

    #[test]
    fn test_render_without_mesh_or_material_is_a_noop() {
        // Must not panic, and must not touch any collaborator.
        SceneObject::new(None, None).render(PassType::Depth);
        SceneObject::new(None, None).render(PassType::Color);
    }

    #[test]
    fn test_render_without_mesh_leaves_material_untouched() {
        let material = Rc::new(Material::new(Rc::new(Program::default())));
        material.set_depth_test_mode(DepthTestMode::Equal);

        let object = SceneObject::new(None, Some(material.clone()));
        object.render(PassType::Depth);

        // A depth-pass dispatch would have selected Standard; the partial object made zero
        // material calls.
        assert_eq!(material.depth_test_mode(), DepthTestMode::Equal);
        assert_eq!(material.stored_uniform(MODEL_MATRIX), None);
    }

    #[test]
    fn test_transform_roundtrips_exactly() {
        let mut object = SceneObject::new(None, None);
        assert_eq!(*object.transform(), nalgebra_glm::identity::<f32, 4>());

        let transform = nalgebra_glm::rotation(0.7, &nalgebra_glm::vec3(0.0, 1.0, 0.0))
            * nalgebra_glm::translation(&nalgebra_glm::vec3(4.0, 5.0, 6.0));
        object.set_transform(transform);
        assert_eq!(*object.transform(), transform);
    }

    #[test]
    fn test_object_without_mesh_is_never_visible() {
        use crate::plane::Plane;

        let everything = Frustum::new(
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, 0.0, -100.0), nalgebra_glm::vec3(0.0, 0.0, 1.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, 100.0, 0.0), nalgebra_glm::vec3(0.0, -1.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, -100.0, 0.0), nalgebra_glm::vec3(0.0, 1.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(100.0, 0.0, 0.0), nalgebra_glm::vec3(-1.0, 0.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(-100.0, 0.0, 0.0), nalgebra_glm::vec3(1.0, 0.0, 0.0)),
        );
        assert!(!SceneObject::new(None, None).within_frustum(&everything));
    }

    #[test]
    #[should_panic(expected = "scene object has no material")]
    fn test_material_accessor_fails_fast() {
        let _ = SceneObject::new(None, None).material();
    }
}
