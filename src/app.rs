//! This module runs a Quince app: it owns the window, the GL context and the main loop, and hands
//! input and timing down to a `Stage`.
//!
//! A stage is updated on a fixed timestep and rendered once per frame. Input such as the keyboard
//! state and mouse is snapshotted on the `App` struct that is passed along to the stage.

use std::time::Instant;

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;
use sdl2::video::SwapInterval;
use sdl2::Sdl;

use super::opengl::Vao;

/// Struct that contains all information about an app, that is passed down to the active `Stage`.
pub struct App {
    // Screen stuff
    /// The current size of the window
    pub window_size: nalgebra_glm::I32Vec2,

    // Main loop stuff
    /// Whether or not the app is running
    pub running: bool,
    /// How many seconds the app has been up
    pub seconds: f32,
    /// How many ticks have occured since the app started
    pub ticks: usize,

    // User input state
    /// Static map of key states, where the boolean at index `k` determines if the scancode `k` is
    /// currently pressed
    pub keys: [bool; 256],
    /// The position of the mouse, relative to the top-left corner of the screen
    pub mouse_pos: nalgebra_glm::Vec2,
    /// The relative motion of the mouse
    pub mouse_vel: nalgebra_glm::Vec2,
    /// Whether the left mouse button is down
    pub mouse_left_down: bool,
    /// Whether the right mouse button is down
    pub mouse_right_down: bool,
    /// The motion of the mouse wheel
    pub mouse_wheel: f32,
}

/// A stage is something that can be updated and rendered by the main loop
pub trait Stage {
    fn update(&mut self, app: &App);
    fn render(&mut self, app: &App);
}

/// Starts a new app around the stage built by `init`. Returns when the window is closed.
pub fn run(
    window_size: nalgebra_glm::I32Vec2,
    window_title: &str,
    init: impl FnOnce(&App) -> Box<dyn Stage>,
) -> Result<(), String> {
    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;

    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
    gl_attr.set_context_version(3, 3);
    gl_attr.set_double_buffer(true);

    let window = video_subsystem
        .window(window_title, window_size.x as u32, window_size.y as u32)
        .resizable()
        .opengl()
        .build()
        .map_err(|e| e.to_string())?;

    let _gl_context = window.gl_create_context()?;
    gl::load_with(|s| video_subsystem.gl_get_proc_address(s) as *const std::os::raw::c_void);

    window
        .subsystem()
        .gl_set_swap_interval(SwapInterval::VSync)?;

    unsafe {
        gl::Enable(gl::DEPTH_TEST);
        gl::DepthFunc(gl::LESS);
        gl::Enable(gl::CULL_FACE);
        gl::Enable(gl::MULTISAMPLE);
        gl::Enable(gl::BLEND);
        gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
    }

    // Core profile: one VAO bound for the context's lifetime; meshes set their own pointers
    let vao = Vao::gen();
    vao.bind();

    log::info!("window and GL 3.3 core context up");

    let mut app = App {
        window_size,
        running: true,
        seconds: 0.0,
        ticks: 0,
        keys: [false; 256],
        mouse_pos: nalgebra_glm::vec2(0.0, 0.0),
        mouse_vel: nalgebra_glm::vec2(0.0, 0.0),
        mouse_left_down: false,
        mouse_right_down: false,
        mouse_wheel: 0.0,
    };

    let mut stage = init(&app);

    let time = Instant::now();
    let mut previous = 0;
    let mut lag = 0;
    let mut frames: usize = 0;
    let mut last_fps_report = 0.0f32;
    const DELTA_T: u128 = 16;
    while app.running {
        app.seconds = time.elapsed().as_secs_f32();
        let current = time.elapsed().as_millis();
        lag += current - previous;
        previous = current;

        while lag >= DELTA_T {
            app.reset_input();
            app.poll_input(&sdl_context);
            stage.update(&app);
            app.ticks += 1;
            lag -= DELTA_T;
        }

        stage.render(&app);
        frames += 1;
        window.gl_swap_window();

        if app.seconds - last_fps_report > 5.0 {
            log::info!("fps: {}", frames / 5);
            last_fps_report = app.seconds;
            frames = 0;
        }
    }

    Ok(())
}

impl App {
    fn reset_input(&mut self) {
        self.mouse_vel = nalgebra_glm::vec2(0.0, 0.0);
        self.mouse_wheel = 0.0;
    }

    fn poll_input(&mut self, sdl_context: &Sdl) {
        let mut event_queue = match sdl_context.event_pump() {
            Ok(pump) => pump,
            Err(e) => {
                log::error!("couldn't pump events: {}", e);
                self.running = false;
                return;
            }
        };
        for event in event_queue.poll_iter() {
            match event {
                Event::Quit { .. } => {
                    self.running = false;
                }

                Event::MouseMotion {
                    x, y, xrel, yrel, ..
                } => {
                    self.mouse_pos = nalgebra_glm::vec2(x as f32, y as f32);
                    self.mouse_vel = nalgebra_glm::vec2(xrel as f32, yrel as f32);
                }

                Event::MouseButtonDown { mouse_btn, .. } => match mouse_btn {
                    sdl2::mouse::MouseButton::Left => self.mouse_left_down = true,
                    sdl2::mouse::MouseButton::Right => self.mouse_right_down = true,
                    _ => {}
                },

                Event::MouseButtonUp { mouse_btn, .. } => match mouse_btn {
                    sdl2::mouse::MouseButton::Left => self.mouse_left_down = false,
                    sdl2::mouse::MouseButton::Right => self.mouse_right_down = false,
                    _ => {}
                },

                Event::MouseWheel { y, .. } => {
                    self.mouse_wheel = y as f32;
                }

                Event::Window { win_event, .. } => {
                    if let WindowEvent::Resized(new_width, new_height) = win_event {
                        self.window_size = nalgebra_glm::I32Vec2::new(new_width, new_height);
                        unsafe {
                            gl::Viewport(0, 0, new_width, new_height);
                        }
                    }
                }

                Event::KeyDown { scancode, .. } => {
                    if let Some(sc) = scancode {
                        if (sc as usize) < self.keys.len() {
                            self.keys[sc as usize] = true;
                        }
                        if self.keys[Scancode::Escape as usize] {
                            self.running = false;
                        }
                    }
                }

                Event::KeyUp { scancode, .. } => {
                    if let Some(sc) = scancode {
                        if (sc as usize) < self.keys.len() {
                            self.keys[sc as usize] = false;
                        }
                    }
                }

                _ => {}
            }
        }
    }
}
