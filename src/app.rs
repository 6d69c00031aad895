use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::catalog::{ModelCatalog, load_models};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::menu::Menu;
use crate::scene::{CrossfadeScene, FrameInput, Keyframes, SceneSettings, Selection, target_size};

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Open the showcase window and run until it is closed.
///
/// Returns the first fatal error hit while starting up or rendering.
pub fn run(config: Config) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = XfadeApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        XfadeApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum XfadeApp {
    Pending { config: Config },
    Running(Box<Running>),
    Failed(Error),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    catalog: ModelCatalog,
    scene: CrossfadeScene,
    input: Input,
    menu: Menu,
    config: Config,
    last_frame: Instant,
}

impl ApplicationHandler for XfadeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let XfadeApp::Pending { config } = self else {
            return;
        };

        match Running::start(event_loop, config.clone()) {
            Ok(running) => *self = XfadeApp::Running(Box::new(running)),
            Err(err) => {
                error!("startup failed: {err}");
                *self = XfadeApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let XfadeApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.resize(size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                app.resize(app.window.inner_size());
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = app.redraw(event_loop) {
                    error!("render loop stopped: {err}");
                    *self = XfadeApp::Failed(err);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: Config) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone(), config.render.msaa)?;
        let catalog = load_models(&gpu, &config.models)?;
        info!(
            "catalog ready: {}/{} models loaded",
            catalog.ready_count(),
            catalog.len()
        );

        let menu = Menu::from_config(&config);
        let initial_model = menu.active_model().unwrap_or(0);

        let mut input = Input::new();
        let size = window.inner_size();
        input.set_viewport(size.width, size.height);

        let settings = SceneSettings {
            initial_model,
            smoothing: config.transition.smoothing,
            tween_seconds: config.transition.tween_seconds,
            easing: config.transition.easing,
            pointer_follow: config.transition.pointer_follow,
            fxaa: config.render.fxaa,
            background: config.render.clear_color,
            camera: config.camera.camera(),
            keyframes: Keyframes::default(),
        };
        let scene = CrossfadeScene::new(
            &gpu,
            catalog.len(),
            slot_target_size(&window, &config, size),
            settings,
        )?;

        window.set_title(&menu.title(&config.window.title));

        Ok(Self {
            window,
            gpu,
            catalog,
            scene,
            input,
            menu,
            config,
            last_frame: Instant::now(),
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.gpu.resize(size.width, size.height);
        let target = slot_target_size(&self.window, &self.config, size);
        self.scene.resize(&self.gpu, target);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.handle_keys(event_loop)?;
        self.scene.update(FrameInput {
            pointer: self.input.pointer(),
            dt,
        });
        self.input.end_frame();

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of memory acquiring the surface texture");
                event_loop.exit();
                return Ok(());
            }
            Err(err) => {
                warn!("skipping frame: {err}");
                self.window.request_redraw();
                return Ok(());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.scene
            .render(&self.gpu, &mut encoder, &view, &self.catalog);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.window.request_redraw();
        Ok(())
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return Ok(());
        }

        let mut requested = None;
        if self.input.key_pressed(KeyCode::ArrowDown) {
            requested = self.menu.move_down();
        }
        if self.input.key_pressed(KeyCode::ArrowUp) {
            requested = self.menu.move_up();
        }
        for (index, key) in DIGIT_KEYS.iter().enumerate() {
            if self.input.key_pressed(*key) && index < self.catalog.len() {
                self.menu.activate_model(index);
                requested = Some(index);
            }
        }

        if let Some(index) = requested {
            let selection = self.scene.select_model(index)?;
            if selection != Selection::Unchanged {
                self.window
                    .set_title(&self.menu.title(&self.config.window.title));
            }
        }
        Ok(())
    }
}

fn slot_target_size(window: &Window, config: &Config, size: PhysicalSize<u32>) -> (u32, u32) {
    let scale_factor = window.scale_factor();
    target_size(
        (size.width, size.height),
        scale_factor,
        config.render.clamp_pixel_ratio(scale_factor),
    )
}
