//! This module defines a flat scene: a camera plus the objects it can see. Traversal order is
//! insertion order, and the caller decides pass order (the depth pre-pass must run before any
//! color pass).

use super::camera::Camera;
use super::material::PassType;
use super::object::SceneObject;

/// A camera and a list of scene objects
pub struct Scene {
    pub camera: Camera,
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create a new empty scene viewed by a camera
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            objects: Vec::new(),
        }
    }

    /// Add an object to the scene
    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// The objects in the scene
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mutable access to the objects in the scene
    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    /// Render every visible object for one pass. The frustum is built once per pass; each object
    /// is culled against it before dispatch. Returns how many objects were drawn.
    pub fn render(&self, pass: PassType) -> usize {
        let frustum = self.camera.build_frustum();
        let mut drawn = 0;
        for object in &self.objects {
            if object.within_frustum(&frustum) {
                object.render(pass);
                drawn += 1;
            }
        }
        drawn
    }
}
