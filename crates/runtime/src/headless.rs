//! Offscreen rendering to a PNG file.

use std::sync::mpsc;

use anyhow::{bail, ensure, Context, Result};
use gpu::WgpuBackend;
use render::{shader, FrameOutcome, FrameRenderer};
use tracing::{debug, info};

use crate::config::Args;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const BYTES_PER_PIXEL: u32 = 4;

/// # Errors
///
/// Fails without a usable GPU adapter, on a degenerate camera, or if the
/// image cannot be written.
pub fn run(args: &Args) -> Result<()> {
    let backend = WgpuBackend::headless(shader::SOURCE, FORMAT).context("failed to create GPU backend")?;
    check_size(args.width, args.height, backend.max_target_dimension())?;
    let target = OffscreenTarget::new(backend.device(), args.width, args.height);
    let mut renderer = FrameRenderer::new(backend, args.renderer_config());
    let scene = args.scene.build();
    let camera = args.camera();

    for frame in 0..args.frames.max(1) {
        renderer.backend_mut().set_target(target.view());
        match renderer.render_frame(&scene, Some(&camera))? {
            FrameOutcome::Drawn { primitives, lights } => {
                debug!(frame, primitives, lights, "rendered offscreen frame");
            }
            FrameOutcome::Skipped(reason) => bail!("cannot render: {reason}"),
        }
    }
    renderer.backend_mut().clear_target();

    let backend = renderer.backend();
    let pixels = target.read_back(backend.device(), backend.queue())?;
    let path = args.output_path();
    image::save_buffer(&path, &pixels, args.width, args.height, image::ColorType::Rgba8)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "saved image");
    Ok(())
}

/// Rejects targets the device cannot allocate.
fn check_size(width: u32, height: u32, max: u32) -> Result<()> {
    ensure!(
        width <= max && height <= max,
        "image size {width}x{height} exceeds the device limit of {max} pixels per side"
    );
    Ok(())
}

struct OffscreenTarget {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Self { texture, width, height }
    }

    fn view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Copies the texture into tightly packed RGBA8 rows.
    fn read_back(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<u8>> {
        let unpadded = self.width * BYTES_PER_PIXEL;
        // rows in a texture copy must be aligned
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("readback") });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d { width: self.width, height: self.height, depth_or_array_layers: 1 },
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("readback callback dropped")?
            .context("failed to map readback buffer")?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * self.height) as usize);
        for row in data.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        buffer.unmap();
        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_within_the_limit_pass() {
        check_size(2560, 1440, 8192).unwrap();
        check_size(2048, 2048, 2048).unwrap();
    }

    #[test]
    fn oversized_target_is_an_error() {
        let err = check_size(2560, 1440, 2048).unwrap_err();
        assert!(err.to_string().contains("2560x1440"), "{err}");
        assert!(check_size(1280, 4096, 2048).is_err());
    }
}
