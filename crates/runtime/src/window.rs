//! Interactive window
//!
//! A winit event loop that renders the selected scene every frame. Left-drag
//! looks around, WASD moves, Space and Shift move up and down.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use gpu::WgpuBackend;
use render::{shader, FrameOutcome, FrameRenderer};
use scene::{Camera, Scene};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::config::Args;

/// Radians of look rotation per pixel of drag.
const LOOK_SENSITIVITY: f32 = 0.004;
/// World units per second.
const MOVE_SPEED: f32 = 3.0;

/// # Errors
///
/// Fails if the window, surface or device cannot be created, or if a frame
/// hits a layout or device error.
pub fn run(args: &Args) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("raymarch")
            .with_inner_size(PhysicalSize::new(args.width, args.height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut state = State::new(window, args)?;
    let mut failure = None;

    event_loop.run(|event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == state.window.id() => {
            if state.input(event) {
                if state.input.exit {
                    elwt.exit();
                }
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => state.resize(*size),
                WindowEvent::RedrawRequested => {
                    state.update();
                    if let Err(err) = state.render() {
                        tracing::error!("{err:#}");
                        failure = Some(err);
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => state.window.request_redraw(),
        _ => {}
    })?;

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[derive(Default)]
struct Input {
    pressed: HashSet<KeyCode>,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
    exit: bool,
}

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    renderer: FrameRenderer<WgpuBackend>,
    scene: Scene,
    camera: Camera,
    input: Input,
    last_frame: Instant,
}

impl State {
    fn new(window: Arc<Window>, args: &Args) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone()).context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to get adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Raymarch Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        ))
        .context("failed to request device")?;

        let max = device.limits().max_texture_dimension_2d;
        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.clamp(1, max),
            height: size.height.clamp(1, max),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let backend = WgpuBackend::new(Arc::new(device), Arc::new(queue), shader::SOURCE, format)
            .context("failed to create GPU backend")?;
        let mut camera = args.camera();
        camera.resize(size.width, size.height);

        Ok(Self {
            window,
            surface,
            config,
            renderer: FrameRenderer::new(backend, args.renderer_config()),
            scene: args.scene.build(),
            camera,
            input: Input::default(),
            last_frame: Instant::now(),
        })
    }

    /// Returns `true` if the event was consumed as camera input.
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return false;
                };
                match event.state {
                    ElementState::Pressed => {
                        if code == KeyCode::Escape {
                            self.input.exit = true;
                        }
                        self.input.pressed.insert(code);
                    }
                    ElementState::Released => {
                        self.input.pressed.remove(&code);
                    }
                }
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.input.dragging = *state == ElementState::Pressed;
                if !self.input.dragging {
                    self.input.last_cursor = None;
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.input.dragging {
                    if let Some(last) = self.input.last_cursor {
                        #[allow(clippy::cast_possible_truncation)]
                        let (dx, dy) = ((position.x - last.x) as f32, (position.y - last.y) as f32);
                        self.camera.rotate(-dx * LOOK_SENSITIVITY, -dy * LOOK_SENSITIVITY);
                    }
                    self.input.last_cursor = Some(*position);
                }
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        // a zero-height camera makes the renderer skip frames until restored
        self.camera.resize(size.width, size.height);
        if size.width > 0 && size.height > 0 {
            let max = self.renderer.backend().max_target_dimension();
            self.config.width = size.width.min(max);
            self.config.height = size.height.min(max);
            self.surface.configure(self.renderer.backend().device(), &self.config);
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let axis = |positive: KeyCode, negative: KeyCode| {
            f32::from(u8::from(self.input.pressed.contains(&positive)))
                - f32::from(u8::from(self.input.pressed.contains(&negative)))
        };
        let local = Vec3::new(
            axis(KeyCode::KeyD, KeyCode::KeyA),
            axis(KeyCode::Space, KeyCode::ShiftLeft),
            axis(KeyCode::KeyS, KeyCode::KeyW),
        );
        if local != Vec3::ZERO {
            self.camera.translate_local(local.normalize() * MOVE_SPEED * dt);
        }
    }

    fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.window.inner_size());
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout");
                return Ok(());
            }
            Err(err) => return Err(err).context("failed to acquire surface texture"),
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.backend_mut().set_target(view);
        let outcome = self.renderer.render_frame(&self.scene, Some(&self.camera));
        self.renderer.backend_mut().clear_target();
        if let FrameOutcome::Skipped(reason) = outcome? {
            tracing::trace!(%reason, "frame skipped");
        }
        output.present();
        Ok(())
    }
}
