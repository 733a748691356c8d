//! Frame orchestration
//!
//! [`FrameRenderer`] drives one backend through the per-frame sequence
//! snapshot → upload → bind → uniforms → draw → release. The only state it
//! carries between frames is whether the backend has been prepared and
//! whether a degenerate camera has already been reported.

use gpu::{layout, RenderBackend, UniformValue};
use scene::{SceneProvider, Viewpoint};
use tracing::{debug, info, warn};

use crate::buffers::FrameBuffers;
use crate::camera::RayParams;
use crate::error::{DegenerateCamera, RenderError};
use crate::gpu_types::{GpuRecord, LightGpu, PrimitiveGpu};
use crate::scene::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Also write the first light to the single-light uniforms
    /// (`lightPos`, `lightIntensity`).
    pub legacy_light_uniforms: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { legacy_light_uniforms: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Drawn { primitives: usize, lights: usize },
    /// No rays could be generated. Buffers were still released.
    Skipped(DegenerateCamera),
}

pub struct FrameRenderer<B: RenderBackend> {
    backend: B,
    config: RendererConfig,
    state: RendererState,
    degenerate_reported: bool,
    frames: u64,
}

impl<B: RenderBackend> FrameRenderer<B> {
    #[must_use]
    pub fn new(backend: B, config: RendererConfig) -> Self {
        Self {
            backend,
            config,
            state: RendererState::Uninitialized,
            degenerate_reported: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> RendererState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> RendererConfig {
        self.config
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Prepares the backend program once and checks its storage layouts
    /// against the host records.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderError::LayoutMismatch`] when the program declares a
    /// different stride than [`PrimitiveGpu`] or [`LightGpu`], or with the
    /// backend's preparation error.
    pub fn initialize(&mut self) -> Result<(), RenderError> {
        if self.state == RendererState::Ready {
            return Ok(());
        }
        self.backend.prepare()?;
        check_stride::<PrimitiveGpu>(&self.backend)?;
        check_stride::<LightGpu>(&self.backend)?;
        self.state = RendererState::Ready;
        info!("renderer ready");
        Ok(())
    }

    /// Renders one frame of `scene` as seen from `viewpoint`.
    ///
    /// A missing or degenerate viewpoint skips the draw and returns
    /// [`FrameOutcome::Skipped`]; the next call tries again.
    ///
    /// # Errors
    ///
    /// Layout and backend errors abort the frame. Buffers allocated before the
    /// failure are released either way.
    pub fn render_frame(
        &mut self,
        scene: &dyn SceneProvider,
        viewpoint: Option<&dyn Viewpoint>,
    ) -> Result<FrameOutcome, RenderError> {
        self.initialize()?;

        let snapshot = Snapshot::build(scene);
        let mut frame = FrameBuffers::new(&mut self.backend);

        let primitives = frame.upload(&snapshot.primitives)?;
        let lights = frame.upload(&snapshot.lights)?;
        frame.bind(&primitives, PrimitiveGpu::SLOT)?;
        frame.bind(&lights, LightGpu::SLOT)?;
        frame.set_uniform(PrimitiveGpu::COUNT_SLOT, count(primitives.count())?)?;
        frame.set_uniform(LightGpu::COUNT_SLOT, count(lights.count())?)?;

        let derived = viewpoint
            .ok_or(DegenerateCamera::MissingViewpoint)
            .and_then(|vp| RayParams::derive(vp).map(|ray| (vp, ray)));
        let (viewpoint, ray) = match derived {
            Ok(found) => found,
            Err(reason) => {
                if !self.degenerate_reported {
                    warn!(%reason, "skipping frame");
                    self.degenerate_reported = true;
                }
                frame.finish()?;
                return Ok(FrameOutcome::Skipped(reason));
            }
        };

        frame.set_uniform(
            layout::BACKGROUND_COLOR,
            UniformValue::Vec4(viewpoint.background_color().to_array()),
        )?;
        for (slot, value) in ray.uniforms() {
            frame.set_uniform(slot, value)?;
        }
        if self.config.legacy_light_uniforms {
            let (position, intensity) =
                snapshot.first_light().map_or(([0.0; 3], 0.0), |l| (l.position, l.intensity));
            frame.set_uniform(layout::LIGHT_POS, UniformValue::Vec3(position))?;
            frame.set_uniform(layout::LIGHT_INTENSITY, UniformValue::Float(intensity))?;
        }

        frame.draw()?;
        frame.release(primitives)?;
        frame.release(lights)?;
        frame.finish()?;

        if self.degenerate_reported {
            info!("camera recovered");
            self.degenerate_reported = false;
        }
        self.frames += 1;
        debug!(
            frame = self.frames,
            primitives = primitives.count(),
            lights = lights.count(),
            "frame drawn"
        );
        Ok(FrameOutcome::Drawn { primitives: primitives.count(), lights: lights.count() })
    }
}

fn check_stride<T: GpuRecord>(backend: &dyn RenderBackend) -> Result<(), RenderError> {
    match backend.expected_stride(T::SLOT) {
        Some(device) if device != T::size_of() => Err(RenderError::LayoutMismatch {
            slot: T::SLOT.to_owned(),
            host: T::size_of(),
            device,
        }),
        _ => Ok(()),
    }
}

fn count(n: usize) -> Result<UniformValue, RenderError> {
    i32::try_from(n).map(UniformValue::Int).map_err(|_| RenderError::TooManyElements(n))
}
