//! A viewer app for the renderer: a field of cubes sharing one mesh and one material, drawn with
//! a depth pre-pass followed by a color pass, with frustum culling in between.
//!
//! Controls: WASD to fly, Q/E to change height, mouse wheel to zoom, O/P to switch between
//! orthographic and perspective projections. Run with `cargo run --bin viewer`.

use std::rc::Rc;

use rand::Rng;
use sdl2::keyboard::Scancode;

use quince::app::{run, App, Stage};
use quince::camera::{Camera, ProjectionKind};
use quince::material::{self, Material, PassType, UniformValue};
use quince::mesh::{Mesh, MeshData};
use quince::object::SceneObject;
use quince::opengl::{create_program, Texture};
use quince::scene::Scene;

const VERT_SRC: &str = r#"
#version 330 core
layout(location = 0) in vec3 in_pos;
layout(location = 1) in vec3 in_normal;
layout(location = 2) in vec2 in_uv;
layout(location = 3) in vec4 in_tangent;
layout(location = 4) in vec3 in_color;

uniform mat4 model;
uniform mat4 view;
uniform mat4 proj;

out vec3 v_normal;
out vec2 v_uv;
out vec3 v_color;

void main() {
    v_normal = mat3(model) * in_normal;
    v_uv = in_uv;
    v_color = in_color;
    gl_Position = proj * view * model * vec4(in_pos, 1.0);
}
"#;

// The depth pass reuses the exact vertex transform above, so the color pass's equality depth
// test sees identical values.
const DEPTH_FRAG_SRC: &str = r#"
#version 330 core
void main() {}
"#;

const COLOR_FRAG_SRC: &str = r#"
#version 330 core
in vec3 v_normal;
in vec2 v_uv;
in vec3 v_color;

uniform sampler2D base_color_tex;
uniform vec3 sun_dir;

out vec4 frag_color;

void main() {
    float light = max(dot(normalize(v_normal), -normalize(sun_dir)), 0.0) * 0.8 + 0.2;
    frag_color = vec4(texture(base_color_tex, v_uv).rgb * v_color * light, 1.0);
}
"#;

fn main() -> Result<(), String> {
    simple_logger::init_with_level(log::Level::Info).map_err(|e| e.to_string())?;
    run(
        nalgebra_glm::I32Vec2::new(1280, 720),
        "Quince Viewer",
        |app| Box::new(Viewer::new(app)),
    )
}

struct Viewer {
    scene: Scene,
    material: Rc<Material>,
    camera_pos: nalgebra_glm::Vec3,
    zoom: f32,
}

impl Viewer {
    fn new(app: &App) -> Self {
        let color_program = Rc::new(
            create_program(VERT_SRC, COLOR_FRAG_SRC).expect("color program should compile"),
        );
        let depth_program = Rc::new(
            create_program(VERT_SRC, DEPTH_FRAG_SRC).expect("depth program should compile"),
        );

        let material = Rc::new(
            Material::new(color_program)
                .with_depth_program(depth_program)
                .with_texture(Rc::new(checkerboard_texture())),
        );
        material.set_stored_uniform(material::BASE_COLOR_TEX, UniformValue::Int(0));
        material.set_stored_uniform(
            material::SUN_DIR,
            UniformValue::Vec3(nalgebra_glm::vec3(-0.4, -1.0, -0.3)),
        );

        let mesh = Rc::new(Mesh::new(&MeshData::cube()));

        let camera_pos = nalgebra_glm::vec3(0.0, 12.0, 40.0);
        let mut scene = Scene::new(Camera::new(
            camera_pos,
            nalgebra_glm::vec3(0.0, 0.0, 0.0),
            nalgebra_glm::vec3(0.0, 1.0, 0.0),
            perspective(app),
        ));

        let mut rng = rand::thread_rng();
        for _ in 0..512 {
            let mut object = SceneObject::new(Some(mesh.clone()), Some(material.clone()));
            let translation = nalgebra_glm::translation(&nalgebra_glm::vec3(
                rng.gen_range(-60.0..60.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-60.0..60.0),
            ));
            let rotation =
                nalgebra_glm::rotation(rng.gen_range(0.0..std::f32::consts::TAU), &nalgebra_glm::vec3(0.0, 1.0, 0.0));
            let scale_factor: f32 = rng.gen_range(0.5..2.0);
            let scale = nalgebra_glm::scaling(&nalgebra_glm::vec3(
                scale_factor,
                scale_factor,
                scale_factor,
            ));
            object.set_transform(translation * rotation * scale);
            scene.add_object(object);
        }

        Self {
            scene,
            material,
            camera_pos,
            zoom: 1.0,
        }
    }
}

fn perspective(app: &App) -> ProjectionKind {
    ProjectionKind::Perspective {
        fov: 1.2,
        aspect: app.window_size.x as f32 / app.window_size.y as f32,
        near: 0.1,
        far: 1000.0,
    }
}

fn orthographic(app: &App, zoom: f32) -> ProjectionKind {
    let aspect = app.window_size.x as f32 / app.window_size.y as f32;
    let half_height = 30.0 * zoom;
    ProjectionKind::Orthographic {
        left: -half_height * aspect,
        right: half_height * aspect,
        bottom: -half_height,
        top: half_height,
        near: -1000.0,
        far: 1000.0,
    }
}

fn checkerboard_texture() -> Texture {
    const SIZE: usize = 64;
    let mut pixels = Vec::with_capacity(SIZE * SIZE * 4);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let bright = (x / 8 + y / 8) % 2 == 0;
            let value = if bright { 220 } else { 90 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    Texture::from_data(SIZE as i32, SIZE as i32, &pixels)
}

impl Stage for Viewer {
    fn update(&mut self, app: &App) {
        const SPEED: f32 = 0.5;
        let mut delta = nalgebra_glm::vec3(0.0, 0.0, 0.0);
        if app.keys[Scancode::W as usize] {
            delta.z -= SPEED;
        }
        if app.keys[Scancode::S as usize] {
            delta.z += SPEED;
        }
        if app.keys[Scancode::A as usize] {
            delta.x -= SPEED;
        }
        if app.keys[Scancode::D as usize] {
            delta.x += SPEED;
        }
        if app.keys[Scancode::Q as usize] {
            delta.y -= SPEED;
        }
        if app.keys[Scancode::E as usize] {
            delta.y += SPEED;
        }
        self.camera_pos += delta;
        self.zoom = (self.zoom * (1.0 - app.mouse_wheel * 0.1)).clamp(0.1, 10.0);

        let camera = &mut self.scene.camera;
        if app.keys[Scancode::O as usize] {
            camera.projection_kind = orthographic(app, self.zoom);
        }
        if app.keys[Scancode::P as usize] {
            camera.projection_kind = perspective(app);
        }
        // Refresh the projection every tick so resizes and zoom land immediately
        if camera.is_orthographic() {
            camera.projection_kind = orthographic(app, self.zoom);
        } else {
            camera.projection_kind = perspective(app);
        }
        camera.set_position(self.camera_pos);
        camera.set_lookat(self.camera_pos + nalgebra_glm::vec3(0.0, -0.3, -1.0));
    }

    fn render(&mut self, app: &App) {
        unsafe {
            gl::ClearColor(0.12, 0.13, 0.18, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        let (view, proj) = self.scene.camera.view_proj_matrices();
        self.material
            .set_stored_uniform(material::VIEW_MATRIX, UniformValue::Mat4(view));
        self.material
            .set_stored_uniform(material::PROJ_MATRIX, UniformValue::Mat4(proj));

        // Depth pre-pass with color writes off, then the shaded pass over equal depths
        unsafe {
            gl::ColorMask(gl::FALSE, gl::FALSE, gl::FALSE, gl::FALSE);
        }
        self.scene.render(PassType::Depth);
        unsafe {
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
        }
        let drawn = self.scene.render(PassType::Color);

        if app.ticks % 300 == 0 {
            log::info!("{}/{} objects in view", drawn, self.scene.objects().len());
        }
    }
}
