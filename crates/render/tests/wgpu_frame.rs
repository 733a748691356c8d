#![cfg(feature = "device-tests")]

use gpu::{layout, GpuError, RenderBackend, WgpuBackend};
use render::{shader, FrameOutcome, FrameRenderer, RendererConfig};
use scene::{Camera, DemoScene};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn backend() -> Option<WgpuBackend> {
    match WgpuBackend::headless(shader::SOURCE, FORMAT) {
        Ok(backend) => Some(backend),
        Err(GpuError::BackendUnavailable) => {
            eprintln!("no GPU adapter, skipping");
            None
        }
        Err(err) => panic!("backend setup failed: {err}"),
    }
}

fn target(backend: &WgpuBackend) -> wgpu::Texture {
    backend.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test target"),
        size: wgpu::Extent3d { width: 64, height: 64, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

fn view(texture: &wgpu::Texture) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[test]
fn draws_every_demo_scene_on_device() {
    let Some(backend) = backend() else { return };
    let texture = target(&backend);
    let mut renderer = FrameRenderer::new(backend, RendererConfig::default());

    for demo in DemoScene::ALL {
        let (eye, look) = demo.framing();
        let camera = Camera::new(64, 64).looking_at(eye, look);
        renderer.backend_mut().set_target(view(&texture));
        let outcome = renderer.render_frame(&demo.build(), Some(&camera)).expect("frame");
        assert!(matches!(outcome, FrameOutcome::Drawn { .. }), "{demo}: {outcome:?}");
    }
    assert_eq!(renderer.frames_drawn(), 3);
}

#[test]
fn draw_without_target_is_an_error() {
    let Some(backend) = backend() else { return };
    let mut renderer = FrameRenderer::new(backend, RendererConfig::default());
    let camera = Camera::new(64, 64);
    let err = renderer.render_frame(&DemoScene::Basic.build(), Some(&camera)).unwrap_err();
    assert_eq!(err, render::RenderError::Gpu(GpuError::NoTarget));
}

#[test]
fn binding_light_records_to_the_primitive_slot_fails() {
    let Some(mut backend) = backend() else { return };
    let id = backend.create_buffer("lights", &[0u8; 16], 1, 16).expect("buffer");
    assert_eq!(
        backend.bind_buffer(layout::PRIMITIVE_BUFFER, id),
        Err(GpuError::SlotStride { slot: layout::PRIMITIVE_BUFFER.into(), host: 16, device: 68 })
    );
}

#[test]
fn device_accepts_common_target_sizes() {
    let Some(backend) = backend() else { return };
    assert!(backend.max_target_dimension() >= 2048);
}
