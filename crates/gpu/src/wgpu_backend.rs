//! [`RenderBackend`] implementation on top of [`wgpu`].
//!
//! The backend owns the compiled ray-marching pipeline and a single uniform
//! buffer for the `FrameUniforms` block. Storage buffers are created per
//! upload and destroyed on release; the caller decides how long they live.
//! Draws go to whatever texture view was last given to
//! [`WgpuBackend::set_target`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::backend::RenderBackend;
use crate::layout::{self, FrameUniforms, FRAME_BINDING};
use crate::pipeline;
use crate::reflect::ShaderLayout;
use crate::{BufferId, GpuError, UniformValue};

struct Program {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

struct StorageBuffer {
    buffer: wgpu::Buffer,
    stride: usize,
}

pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    shader_source: String,
    layout: ShaderLayout,
    format: wgpu::TextureFormat,
    program: Option<Program>,
    buffers: HashMap<BufferId, StorageBuffer>,
    released: HashSet<BufferId>,
    bound: HashMap<String, BufferId>,
    uniforms: FrameUniforms,
    target: Option<wgpu::TextureView>,
    next_id: u64,
}

impl WgpuBackend {
    /// Wraps an existing device. The shader is validated and reflected here;
    /// the pipeline itself is built on the first [`RenderBackend::prepare`].
    ///
    /// # Errors
    ///
    /// [`GpuError::Shader`] if `shader_source` does not validate.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        shader_source: &str,
        format: wgpu::TextureFormat,
    ) -> Result<Self, GpuError> {
        let layout = ShaderLayout::from_wgsl(shader_source)?;
        Ok(Self {
            device,
            queue,
            shader_source: shader_source.to_owned(),
            layout,
            format,
            program: None,
            buffers: HashMap::new(),
            released: HashSet::new(),
            bound: HashMap::new(),
            uniforms: FrameUniforms::default(),
            target: None,
            next_id: 0,
        })
    }

    /// Creates a backend on the system's default high-performance adapter
    /// without a surface.
    ///
    /// # Errors
    ///
    /// [`GpuError::BackendUnavailable`] if no adapter or device is found.
    pub fn headless(shader_source: &str, format: wgpu::TextureFormat) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or(GpuError::BackendUnavailable)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Raymarch Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|_| GpuError::BackendUnavailable)?;

        tracing::info!(adapter = ?adapter.get_info().name, "headless wgpu backend ready");
        Self::new(Arc::new(device), Arc::new(queue), shader_source, format)
    }

    #[must_use]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Largest width or height of a render target on this device.
    #[must_use]
    pub fn max_target_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    #[must_use]
    pub fn layout(&self) -> &ShaderLayout {
        &self.layout
    }

    /// Sets the texture view the next draw renders into.
    pub fn set_target(&mut self, view: wgpu::TextureView) {
        self.target = Some(view);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    fn live(&self, buffer: BufferId) -> Result<&StorageBuffer, GpuError> {
        if self.released.contains(&buffer) {
            return Err(GpuError::UseAfterRelease(buffer));
        }
        self.buffers.get(&buffer).ok_or(GpuError::UnknownBuffer(buffer))
    }

    fn bound_buffer(&self, slot: &str) -> Result<&wgpu::Buffer, GpuError> {
        let id = self
            .bound
            .get(slot)
            .copied()
            .ok_or_else(|| GpuError::DrawFailed(format!("slot `{slot}` is not bound")))?;
        Ok(&self.live(id)?.buffer)
    }
}

impl RenderBackend for WgpuBackend {
    fn prepare(&mut self) -> Result<(), GpuError> {
        if self.program.is_some() {
            return Ok(());
        }
        let bind_group_layout = pipeline::create_bind_group_layout(&self.device);
        let pipeline = pipeline::create_render_pipeline(
            &self.device,
            &bind_group_layout,
            &self.shader_source,
            self.format,
        );
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::bytes_of(&self.uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        self.program = Some(Program { pipeline, bind_group_layout, uniform_buffer });
        tracing::info!(format = ?self.format, "raymarch pipeline compiled");
        Ok(())
    }

    fn create_buffer(
        &mut self,
        label: &str,
        data: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<BufferId, GpuError> {
        if data.len() != count * stride {
            return Err(GpuError::StrideMismatch { len: data.len(), count, stride });
        }
        // A zero-sized storage binding is invalid, so an empty array still
        // gets one zeroed element. The shader never reads it.
        let buffer = if data.is_empty() {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: stride.max(4) as u64,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        } else {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            })
        };
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(id, StorageBuffer { buffer, stride });
        Ok(id)
    }

    fn bind_buffer(&mut self, slot: &str, buffer: BufferId) -> Result<(), GpuError> {
        let stride = self.live(buffer)?.stride;
        if layout::storage_binding(slot).is_none() {
            return Err(GpuError::UnknownSlot(slot.to_owned()));
        }
        if let Some(device) = self.layout.stride(slot) {
            if device != stride {
                return Err(GpuError::SlotStride { slot: slot.to_owned(), host: stride, device });
            }
        }
        self.bound.insert(slot.to_owned(), buffer);
        Ok(())
    }

    fn set_uniform(&mut self, slot: &str, value: UniformValue) -> Result<(), GpuError> {
        self.uniforms.set(slot, value)
    }

    fn draw(&mut self) -> Result<(), GpuError> {
        self.prepare()?;
        let target = self.target.as_ref().ok_or(GpuError::NoTarget)?;
        let primitives = self.bound_buffer(layout::PRIMITIVE_BUFFER)?;
        let lights = self.bound_buffer(layout::LIGHT_BUFFER)?;
        let Some(program) = self.program.as_ref() else {
            return Err(GpuError::DrawFailed("pipeline missing after prepare".into()));
        };

        self.queue.write_buffer(&program.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raymarch Bind Group"),
            layout: &program.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: FRAME_BINDING,
                    resource: program.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: layout::PRIMITIVE_BINDING,
                    resource: primitives.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: layout::LIGHT_BINDING,
                    resource: lights.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Raymarch Encoder") });
        {
            let [r, g, b, a] = self.uniforms.background_color;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raymarch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&program.pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        tracing::trace!("raymarch draw submitted");
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferId) -> Result<(), GpuError> {
        self.live(buffer)?;
        if let Some(storage) = self.buffers.remove(&buffer) {
            storage.buffer.destroy();
        }
        self.released.insert(buffer);
        self.bound.retain(|_, id| *id != buffer);
        Ok(())
    }

    fn expected_stride(&self, slot: &str) -> Option<usize> {
        self.layout.stride(slot)
    }
}
