//! This module defines materials and the rendering passes they are bound for. A material owns the
//! shader programs and textures for an object's surface, plus a small store of uniforms that are
//! flushed to the active program each time the material is bound.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::opengl::{hash_uniform_name, Program, Texture, UniformKey};

/// Key for the model-to-world matrix uniform, as consumed by the shaders
pub const MODEL_MATRIX: UniformKey = hash_uniform_name("model");
/// Key for the world-to-view matrix uniform
pub const VIEW_MATRIX: UniformKey = hash_uniform_name("view");
/// Key for the projection matrix uniform
pub const PROJ_MATRIX: UniformKey = hash_uniform_name("proj");
/// Key for the directional light vector uniform
pub const SUN_DIR: UniformKey = hash_uniform_name("sun_dir");
/// Key for the base color sampler uniform
pub const BASE_COLOR_TEX: UniformKey = hash_uniform_name("base_color_tex");

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// How fragments are depth-tested while a material is bound
pub enum DepthTestMode {
    /// Ordinary less-than test; used while the depth buffer is being populated
    Standard,
    /// Exact-equality test; only shades pixels whose depth was already written by a depth
    /// pre-pass
    Equal,
}

impl DepthTestMode {
    fn apply(self) {
        unsafe {
            match self {
                DepthTestMode::Standard => gl::DepthFunc(gl::LESS),
                DepthTestMode::Equal => gl::DepthFunc(gl::EQUAL),
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Identity of a rendering pass. The depth pre-pass must run strictly before any pass that
/// relies on the equality depth test.
pub enum PassType {
    /// Depth-only pre-pass
    Depth,
    /// Shaded color pass
    Color,
}

impl PassType {
    /// The depth-test mode an object rendered for this pass should use
    pub fn depth_test_mode(self) -> DepthTestMode {
        match self {
            PassType::Depth => DepthTestMode::Standard,
            _ => DepthTestMode::Equal,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
/// A value held in a material's uniform store
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(nalgebra_glm::Vec3),
    Mat4(nalgebra_glm::Mat4),
}

/// A surface description shared between scene objects: shader programs, textures, and the
/// uniform/depth state to apply when bound.
///
/// Materials live on the render thread only; the mutable bits use `Cell`/`RefCell` so that a
/// shared `Rc<Material>` can be written through during dispatch.
pub struct Material {
    program: Rc<Program>,
    depth_program: Option<Rc<Program>>,
    textures: Vec<Rc<Texture>>,
    uniforms: RefCell<HashMap<UniformKey, UniformValue>>,
    depth_test_mode: Cell<DepthTestMode>,
}

impl Material {
    /// Create a new material around the program used for color passes
    pub fn new(program: Rc<Program>) -> Self {
        Self {
            program,
            depth_program: None,
            textures: Vec::new(),
            uniforms: RefCell::new(HashMap::new()),
            depth_test_mode: Cell::new(DepthTestMode::Standard),
        }
    }

    /// Use a dedicated (usually fragment-less) program for the depth pre-pass
    pub fn with_depth_program(mut self, program: Rc<Program>) -> Self {
        self.depth_program = Some(program);
        self
    }

    /// Attach a texture. Textures are activated on units in the order they were attached.
    pub fn with_texture(mut self, texture: Rc<Texture>) -> Self {
        self.textures.push(texture);
        self
    }

    /// Select the depth-test mode to apply at the next bind
    pub fn set_depth_test_mode(&self, mode: DepthTestMode) {
        self.depth_test_mode.set(mode);
    }

    /// The currently selected depth-test mode
    pub fn depth_test_mode(&self) -> DepthTestMode {
        self.depth_test_mode.get()
    }

    /// Store a uniform value under its hashed name. The value is uploaded at every bind; programs
    /// that don't declare the uniform ignore it.
    pub fn set_stored_uniform(&self, key: UniformKey, value: UniformValue) {
        self.uniforms.borrow_mut().insert(key, value);
    }

    /// Read back a stored uniform value
    pub fn stored_uniform(&self, key: UniformKey) -> Option<UniformValue> {
        self.uniforms.borrow().get(&key).copied()
    }

    /// The program this material uses for a pass
    pub fn program_for_pass(&self, pass: PassType) -> &Rc<Program> {
        match pass {
            PassType::Depth => self.depth_program.as_ref().unwrap_or(&self.program),
            _ => &self.program,
        }
    }

    /// Make this material current for the given pass: applies the selected depth-test mode, uses
    /// the pass's program, flushes the stored uniforms it declares, and activates the textures.
    pub fn bind(&self, pass: PassType) {
        self.depth_test_mode.get().apply();

        let program = self.program_for_pass(pass);
        program.set();

        for (key, value) in self.uniforms.borrow().iter() {
            let Some(location) = program.uniform_location(*key) else {
                continue;
            };
            match value {
                UniformValue::Float(v) => program.set_uniform_f32(location, *v),
                UniformValue::Int(v) => program.set_uniform_i32(location, *v),
                UniformValue::Vec3(v) => program.set_uniform_vec3(location, v),
                UniformValue::Mat4(v) => program.set_uniform_mat4(location, v),
            }
        }

        for (unit, texture) in self.textures.iter().enumerate() {
            texture.activate(unit as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_depth_mode_selection() {
        assert_eq!(PassType::Depth.depth_test_mode(), DepthTestMode::Standard);
        assert_eq!(PassType::Color.depth_test_mode(), DepthTestMode::Equal);
    }

    #[test]
    fn test_uniform_keys_are_distinct() {
        let keys = [MODEL_MATRIX, VIEW_MATRIX, PROJ_MATRIX, SUN_DIR, BASE_COLOR_TEX];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_stored_uniform_roundtrips_exactly() {
        let material = Material::new(Rc::new(Program::default()));

        let transform = nalgebra_glm::translation(&nalgebra_glm::vec3(1.25, -2.5, 3.75))
            * nalgebra_glm::scaling(&nalgebra_glm::vec3(0.1, 20.0, 300.0));
        material.set_stored_uniform(MODEL_MATRIX, UniformValue::Mat4(transform));

        // A stored matrix is a plain copy; it must read back bit-for-bit.
        assert_eq!(
            material.stored_uniform(MODEL_MATRIX),
            Some(UniformValue::Mat4(transform))
        );
        assert_eq!(material.stored_uniform(VIEW_MATRIX), None);
    }

    #[test]
    fn test_depth_mode_state() {
        let material = Material::new(Rc::new(Program::default()));
        assert_eq!(material.depth_test_mode(), DepthTestMode::Standard);

        material.set_depth_test_mode(DepthTestMode::Equal);
        assert_eq!(material.depth_test_mode(), DepthTestMode::Equal);

        material.set_depth_test_mode(DepthTestMode::Standard);
        assert_eq!(material.depth_test_mode(), DepthTestMode::Standard);
    }
}
