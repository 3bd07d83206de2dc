//! This module contains OpenGL objects.

use std::{
    collections::HashMap,
    ffi::CString,
    marker::PhantomData,
    path::Path,
    ptr::{null, null_mut},
};

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLuint};

use image::{EncodableLayout, ImageError};

/// Opaque key into a program's uniform table: a stable hash of the uniform's name.
pub type UniformKey = u32;

/// FNV-1a hash of a uniform name. `const`, so keys for well-known names are computed at compile
/// time and stay stable across frames and processes.
pub const fn hash_uniform_name(name: &str) -> UniformKey {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811c9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x01000193);
        i += 1;
    }
    hash
}

/// An OpenGL Shader
pub struct Shader {
    id: GLuint,
}

impl Shader {
    /// Compile an OpenGL shader from GLSL source
    pub fn from_source(source: &str, kind: GLenum) -> Result<Self, String> {
        let source = CString::new(source).map_err(|_| "shader source contains a NUL byte")?;
        let id = unsafe { gl::CreateShader(kind) };
        check_errors();

        unsafe {
            gl::ShaderSource(id, 1, &source.as_ptr(), null());
            gl::CompileShader(id);
        }
        check_errors();

        let mut success: GLint = 1;
        unsafe {
            gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut success);
        }
        check_errors();

        if success == 0 {
            let mut len: GLint = 0;
            unsafe { gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len) }
            check_errors();

            let error = create_whitespace_cstring_with_len(len as usize);
            unsafe {
                gl::GetShaderInfoLog(id, len, null_mut(), error.as_ptr() as *mut GLchar);
            }
            check_errors();

            let message = error.to_string_lossy().into_owned();
            log::error!("shader compilation failed: {}", message);
            return Err(message);
        }

        Ok(Shader { id })
    }

    /// Retrieve the OpenGL ID of this shader
    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::DeleteShader(self.id);
            }
        }
    }
}

#[derive(Default)]
/// A linked OpenGL program, with its active uniforms indexed by hashed name
pub struct Program {
    id: GLuint,
    uniform_locations: HashMap<UniformKey, GLint>,
}

impl Program {
    fn from_shaders(shaders: &[Shader]) -> Result<Self, String> {
        let id = unsafe { gl::CreateProgram() };
        check_errors();

        for shader in shaders {
            unsafe {
                gl::AttachShader(id, shader.id());
            }
            check_errors();
        }

        unsafe {
            gl::LinkProgram(id);
        }
        check_errors();

        let mut success: GLint = 1;
        unsafe {
            gl::GetProgramiv(id, gl::LINK_STATUS, &mut success);
        }
        check_errors();

        if success == 0 {
            let mut len: GLint = 0;
            unsafe {
                gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len);
            }
            check_errors();

            let error = create_whitespace_cstring_with_len(len as usize);
            unsafe {
                gl::GetProgramInfoLog(id, len, null_mut(), error.as_ptr() as *mut GLchar);
            }
            check_errors();

            let message = error.to_string_lossy().into_owned();
            log::error!("program link failed: {}", message);
            return Err(message);
        }

        for shader in shaders {
            unsafe {
                gl::DetachShader(id, shader.id());
            }
            check_errors();
        }

        let uniform_locations = fetch_uniform_locations(id);
        log::debug!(
            "linked program {} with {} active uniform(s)",
            id,
            uniform_locations.len()
        );

        Ok(Program {
            id,
            uniform_locations,
        })
    }

    /// Tell OpenGL to use this program
    pub fn set(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
        check_errors();
    }

    /// Retrieve the OpenGL ID of this program
    pub fn id(&self) -> GLuint {
        self.id
    }

    /// Look up the location of an active uniform by its hashed name
    pub fn uniform_location(&self, key: UniformKey) -> Option<GLint> {
        self.uniform_locations.get(&key).copied()
    }

    /// Upload a mat4 uniform. The program must currently be in use.
    pub fn set_uniform_mat4(&self, location: GLint, value: &nalgebra_glm::Mat4) {
        unsafe {
            gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr());
        }
        check_errors();
    }

    /// Upload a vec3 uniform. The program must currently be in use.
    pub fn set_uniform_vec3(&self, location: GLint, value: &nalgebra_glm::Vec3) {
        unsafe {
            gl::Uniform3f(location, value.x, value.y, value.z);
        }
        check_errors();
    }

    /// Upload a float uniform. The program must currently be in use.
    pub fn set_uniform_f32(&self, location: GLint, value: f32) {
        unsafe {
            gl::Uniform1f(location, value);
        }
        check_errors();
    }

    /// Upload an int uniform (also used for sampler bindings). The program must currently be in
    /// use.
    pub fn set_uniform_i32(&self, location: GLint, value: i32) {
        unsafe {
            gl::Uniform1i(location, value);
        }
        check_errors();
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::DeleteProgram(self.id);
            }
        }
    }
}

/// Enumerate a linked program's active uniforms into a hashed-name -> location table
fn fetch_uniform_locations(id: GLuint) -> HashMap<UniformKey, GLint> {
    let mut count: GLint = 0;
    unsafe {
        gl::GetProgramiv(id, gl::ACTIVE_UNIFORMS, &mut count);
    }
    check_errors();

    let mut max_len: GLint = 0;
    unsafe {
        gl::GetProgramiv(id, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);
    }
    check_errors();

    let mut locations = HashMap::with_capacity(count as usize);
    for index in 0..count as GLuint {
        let name = create_whitespace_cstring_with_len(max_len as usize);
        let mut written: GLsizei = 0;
        let mut size: GLint = 0;
        let mut kind: GLenum = 0;
        unsafe {
            gl::GetActiveUniform(
                id,
                index,
                max_len,
                &mut written,
                &mut size,
                &mut kind,
                name.as_ptr() as *mut GLchar,
            );
        }
        check_errors();

        // GL wrote the name and a terminator into the buffer; the location lookup can take the
        // pointer as-is, the hash needs the trimmed bytes.
        let location = unsafe { gl::GetUniformLocation(id, name.as_ptr()) };
        check_errors();

        let trimmed = &name.as_bytes()[..written as usize];
        let key = hash_uniform_name(&String::from_utf8_lossy(trimmed));
        locations.insert(key, location);
    }
    locations
}

fn create_whitespace_cstring_with_len(len: usize) -> CString {
    let mut buffer: Vec<u8> = Vec::with_capacity(len + 1);
    buffer.extend([b' '].iter().cycle().take(len));
    unsafe { CString::from_vec_unchecked(buffer) }
}

/// Create a program with a vert and frag shader
pub fn create_program(vert_data: &str, frag_data: &str) -> Result<Program, String> {
    let vert_shader = Shader::from_source(vert_data, gl::VERTEX_SHADER)?;
    let frag_shader = Shader::from_source(frag_data, gl::FRAGMENT_SHADER)?;
    Program::from_shaders(&[vert_shader, frag_shader])
}

/// OpenGL buffer object. Holds GPU-resident vertex or index data; exclusively owned, never
/// duplicated.
pub struct Buffer<T> {
    id: GLuint,
    target: GLenum,
    phantom: PhantomData<T>,
}

impl<T> Buffer<T> {
    /// Create a new OpenGL Buffer
    pub fn gen(target: GLenum) -> Self {
        let mut id: GLuint = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
        }
        check_errors();
        Buffer::<T> {
            id,
            target,
            phantom: PhantomData,
        }
    }

    /// Set the buffer's data
    pub fn set_data(&self, data: &[T]) {
        self.bind();
        unsafe {
            gl::BufferData(
                self.target,
                std::mem::size_of_val(data) as gl::types::GLsizeiptr,
                data.as_ptr() as *const gl::types::GLvoid,
                gl::STATIC_DRAW,
            );
        }
        check_errors();
    }

    /// Bind the buffer in OpenGL
    pub fn bind(&self) {
        unsafe {
            gl::BindBuffer(self.target, self.id);
        }
        check_errors();
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::BindBuffer(self.target, 0);
                gl::DeleteBuffers(1, &self.id);
            }
        }
    }
}

/// The context-global Vertex Array Object a core profile requires before any attribute setup
pub struct Vao {
    id: GLuint,
}

impl Vao {
    /// Create a new VAO
    pub fn gen() -> Self {
        let mut id: GLuint = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut id);
        }
        check_errors();
        Vao { id }
    }

    /// Bind this VAO
    pub fn bind(&self) {
        unsafe {
            gl::BindVertexArray(self.id);
        }
        check_errors();
    }
}

impl Drop for Vao {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::BindVertexArray(0);
                gl::DeleteVertexArrays(1, &self.id);
            }
        }
    }
}

/// An OpenGL Texture
pub struct Texture {
    id: GLuint,
}

impl Texture {
    /// Create a new blank OpenGL texture
    pub fn new() -> Self {
        let mut id: GLuint = 0;
        unsafe { gl::GenTextures(1, &mut id) }
        check_errors();
        Self { id }
    }

    /// Create an OpenGL texture from an image file
    pub fn from_png(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let texture = Texture::new();
        texture.load(path.as_ref())?;
        Ok(texture)
    }

    /// Create an OpenGL texture from raw tightly-packed RGBA8 pixels
    pub fn from_data(width: i32, height: i32, pixels: &[u8]) -> Self {
        let texture = Texture::new();
        texture.bind();
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                width,
                height,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const std::ffi::c_void,
            );
        }
        check_errors();
        Self::set_default_params();
        texture
    }

    /// Bind this texture
    pub fn bind(&self) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, self.id) }
        check_errors();
    }

    /// Load an image file into this texture
    pub fn load(&self, path: &Path) -> Result<(), ImageError> {
        self.bind();

        let img = image::open(path)?.into_rgba8();
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                img.width() as i32,
                img.height() as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                img.as_bytes().as_ptr() as *const _,
            );
        }
        check_errors();
        Self::set_default_params();
        unsafe {
            gl::GenerateMipmap(gl::TEXTURE_2D);
        }
        check_errors();
        Ok(())
    }

    /// Activate this texture on a texture unit
    pub fn activate(&self, unit: GLuint) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
        }
        self.bind();
        check_errors();
    }

    fn set_default_params() {
        unsafe {
            gl::TexParameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_S,
                gl::CLAMP_TO_EDGE as GLint,
            );
            gl::TexParameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_T,
                gl::CLAMP_TO_EDGE as GLint,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
        }
        check_errors();
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::DeleteTextures(1, [self.id].as_ptr());
            }
        }
    }
}

/// Panic with a decoded message if OpenGL has flagged any errors
pub(crate) fn check_errors() {
    if let Some(error_message) = get_last_opengl_error() {
        panic!("OpenGL Error:\n{}", error_message);
    }
}

fn get_last_opengl_error() -> Option<String> {
    let mut errors = Vec::new();

    unsafe {
        loop {
            let error_code = gl::GetError();
            if error_code == gl::NO_ERROR {
                break;
            }

            let error_message = match error_code {
                gl::INVALID_ENUM => "GL_INVALID_ENUM: An unacceptable value is specified for an enumerated argument.".to_string(),
                gl::INVALID_VALUE => "GL_INVALID_VALUE: A numeric argument is out of range.".to_string(),
                gl::INVALID_OPERATION => "GL_INVALID_OPERATION: The specified operation is not allowed in the current state.".to_string(),
                gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW: This command would cause a stack overflow.".to_string(),
                gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW: This command would cause a stack underflow.".to_string(),
                gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY: There is not enough memory left to execute the command.".to_string(),
                gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION: The framebuffer object is not complete.".to_string(),
                _ => format!("Unknown OpenGL error code: {}", error_code),
            };

            errors.push(error_message);
        }
    }

    if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_distinct() {
        const MODEL: UniformKey = hash_uniform_name("model");
        assert_eq!(MODEL, hash_uniform_name("model"));
        assert_ne!(hash_uniform_name("model"), hash_uniform_name("view"));
        assert_ne!(hash_uniform_name("view"), hash_uniform_name("proj"));
        assert_ne!(hash_uniform_name(""), hash_uniform_name("model"));
    }

    #[test]
    fn test_default_program_has_no_uniforms() {
        // A default (id 0) program never resolves a location and is safe to drop without a
        // context.
        let program = Program::default();
        assert!(program.uniform_location(hash_uniform_name("model")).is_none());
    }
}
