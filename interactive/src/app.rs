use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin::display::GetGlDisplay;

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Instant;

use cgmath::{Matrix4, Rad, Vector3};

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use gl_wrapper::logging::logged;
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::{NativeGl, Program, ProgramError, SourceError};

use crate::args::ArgsInteractive;

/// Number of fragment shading modes the built-in shader knows about.
const MODES: i32 = 3;

pub struct App {
    event_loop: EventLoop<()>,
    ctx: AppContext,
}

/// Everything the render loop reads or mutates between frames.
///
/// GL objects are declared before the context so they are released while
/// it is still alive.
pub struct AppContext {
    program: Option<Program>,
    renderer: GlRenderer<NativeGl>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    start: Instant,
    mode: i32,
    flip: bool,
}

impl App {
    pub fn new(args: &ArgsInteractive) -> Result<Self, AppError> {
        let builder = args.program_builder()?;

        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(args.width, args.height)))
            .with_min_inner_size(Size::Physical(PhysicalSize::new(32, 32)))
            .with_title("LearnOpenGL");
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|best, c| {
                        if c.num_samples() > best.num_samples() {
                            c
                        } else {
                            best
                        }
                    })
                    .expect("display offers no framebuffer configs")
            })
            .map_err(|e| AppError::Context(e.to_string()))?;

        let window = window.ok_or_else(|| AppError::Context("no window was created".into()))?;
        let handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(handle));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        let gl = NativeGl::load_with(|s| match CString::new(s) {
            Ok(name) => gl_display.get_proc_address(name.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });

        let program = logged("build_program", || builder.build(gl))?;

        let renderer = GlRenderer::new(gl);
        renderer.resize(args.width, args.height);

        Ok(Self {
            event_loop,
            ctx: AppContext {
                program: Some(program),
                renderer,
                gl_context,
                gl_window,
                start: Instant::now(),
                mode: 0,
                flip: false,
            },
        })
    }

    pub fn run(self) -> ! {
        let mut ctx = self.ctx;

        self.event_loop
            .run(move |event, _window_target, control_flow| {
                *control_flow = ControlFlow::Poll;
                match event {
                    Event::MainEventsCleared => ctx.gl_window.window.request_redraw(),
                    Event::RedrawRequested(_) => {
                        ctx.draw();

                        if let Err(e) = ctx.gl_window.surface.swap_buffers(&ctx.gl_context) {
                            log::error!("could not swap buffers: {e}");
                            control_flow.set_exit();
                        }
                    }
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::Resized(size) => ctx.resize(size),
                        WindowEvent::KeyboardInput {
                            input:
                                KeyboardInput {
                                    state: ElementState::Pressed,
                                    virtual_keycode: Some(key),
                                    ..
                                },
                            ..
                        } => match key {
                            VirtualKeyCode::Escape => control_flow.set_exit(),
                            VirtualKeyCode::M => ctx.mode = (ctx.mode + 1) % MODES,
                            VirtualKeyCode::F => ctx.flip = !ctx.flip,
                            _ => {}
                        },
                        WindowEvent::CloseRequested => control_flow.set_exit(),
                        _ => (),
                    },
                    Event::LoopDestroyed => {
                        if let Some(program) = ctx.program.take() {
                            ctx.renderer.forget(&program);
                            program.destroy();
                        }
                        log::info!("bye");
                    }
                    _ => (),
                }
            })
    }
}

impl AppContext {
    fn draw(&mut self) {
        let time = self.start.elapsed().as_secs_f32();

        self.renderer.clear_color(0.2, 0.3, 0.3);

        if let Some(program) = &self.program {
            self.renderer.use_program(program);

            program.set_uniform("time", time);
            program.set_uniform("tint", Vector3::new(0.0, time.sin() / 2.0 + 0.5, 0.0));
            program.set_uniform(
                "transform",
                Matrix4::from_angle_z(Rad(time)) * Matrix4::from_scale(0.5),
            );
            program.set_uniform("mode", self.mode);
            program.set_uniform("flip", self.flip);

            self.renderer.draw_fullscreen(program);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let width = NonZeroU32::new(size.width);
        let height = NonZeroU32::new(size.height);

        if let (Some(width), Some(height)) = (width, height) {
            self.gl_window.surface.resize(&self.gl_context, width, height);
            self.renderer.resize(size.width, size.height);
        }
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let raw_window_handle = window.raw_window_handle();

        let (width, height) = match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(AppError::Context("window has no area".into())),
        };

        let attrs =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window_handle, width, height);

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { window, surface })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not set up the GL context: {0}")]
    Context(String),
    #[error(transparent)]
    Glutin(#[from] glutin::error::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Program(#[from] ProgramError),
}
