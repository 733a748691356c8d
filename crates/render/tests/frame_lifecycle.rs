use glam::{Vec3, Vec4};
use gpu::{layout, BufferId, Call, GpuError, MockGpu, RenderBackend, UniformValue};
use render::{
    DegenerateCamera, FrameOutcome, FrameRenderer, GpuRecord, LightGpu, PrimitiveGpu,
    RenderError, RendererConfig, RendererState,
};
use scene::{Camera, DemoScene, Light, Primitive, PrimitiveKind, Scene, Viewpoint};

fn renderer() -> FrameRenderer<MockGpu> {
    let gpu = MockGpu::from_shader(render::shader::SOURCE).expect("shader");
    FrameRenderer::new(gpu, RendererConfig::default())
}

fn camera() -> Camera {
    Camera::new(1920, 1080).looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0))
}

fn uploads(calls: &[Call]) -> Vec<(BufferId, String, usize)> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Upload { buffer, label, len } => Some((*buffer, label.clone(), *len)),
            _ => None,
        })
        .collect()
}

fn position(calls: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
    calls.iter().position(pred).expect("call not recorded")
}

#[test]
fn sphere_and_light_end_to_end() -> anyhow::Result<()> {
    let scene = DemoScene::Basic.build();
    let cam = camera();
    let mut renderer = renderer();

    let outcome = renderer.render_frame(&scene, Some(&cam as &dyn Viewpoint))?;
    assert_eq!(outcome, FrameOutcome::Drawn { primitives: 1, lights: 1 });
    assert_eq!(renderer.state(), RendererState::Ready);

    let gpu = renderer.backend();
    let uploaded = uploads(gpu.calls());
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0].2, 68);
    assert_eq!(uploaded[1].2, 16);

    let uniforms = gpu.uniforms();
    assert_eq!(uniforms.num_primitives, 1);
    assert_eq!(uniforms.num_lights, 1);
    assert_eq!(uniforms.light_pos, [0.0, 5.0, 0.0]);
    assert_eq!(uniforms.light_intensity, 2.0);
    assert_eq!(uniforms.background_color, cam.background.to_array());
    assert_eq!(uniforms.v_fov, cam.fovy);
    assert!((uniforms.h_fov - render::horizontal_fov(cam.fovy, 16.0 / 9.0)).abs() < 1e-6);
    assert_eq!(uniforms.c2w, cam.camera_to_world().to_cols_array_2d());
    assert_eq!(gpu.live_buffers(), 0);
    Ok(())
}

#[test]
fn uploaded_bytes_decode_to_scene_values() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    scene.add_primitive(
        Primitive::new(PrimitiveKind::Mandelbulb, Vec3::new(1.0, 2.0, 3.0))
            .with_color(Vec4::new(0.5, 0.25, 1.0, 1.0))
            .with_iterations(1.0, 9.0)
            .with_orbit_trap(true),
    );
    scene.add_light(Light::new(Vec3::new(-1.0, 4.0, 2.0), 0.75));

    let snapshot = render::Snapshot::build(&scene);
    let mut gpu = MockGpu::from_shader(render::shader::SOURCE)?;
    let prims = gpu.create_buffer(
        PrimitiveGpu::LABEL,
        bytemuck::cast_slice(&snapshot.primitives),
        snapshot.primitives.len(),
        PrimitiveGpu::size_of(),
    )?;
    let lights = gpu.create_buffer(
        LightGpu::LABEL,
        bytemuck::cast_slice(&snapshot.lights),
        snapshot.lights.len(),
        LightGpu::size_of(),
    )?;

    let bytes = gpu.buffer_data(prims).expect("primitive bytes");
    let decoded: &[PrimitiveGpu] = bytemuck::cast_slice(bytes);
    assert_eq!(decoded, snapshot.primitives.as_slice());
    assert_eq!(decoded[0].kind, PrimitiveKind::Mandelbulb.tag());
    assert_eq!(decoded[0].iteration_bounds, [1.0, 9.0]);
    assert_eq!(decoded[0].orbit_trap, 1.0);

    let bytes = gpu.buffer_data(lights).expect("light bytes");
    let decoded: &[LightGpu] = bytemuck::cast_slice(bytes);
    assert_eq!(decoded, &[LightGpu { position: [-1.0, 4.0, 2.0], intensity: 0.75 }]);
    Ok(())
}

#[test]
fn empty_scene_completes_the_frame() -> anyhow::Result<()> {
    let scene = DemoScene::Empty.build();
    let cam = camera();
    let mut renderer = renderer();

    let outcome = renderer.render_frame(&scene, Some(&cam))?;
    assert_eq!(outcome, FrameOutcome::Drawn { primitives: 0, lights: 0 });

    let gpu = renderer.backend();
    let uploaded = uploads(gpu.calls());
    assert_eq!(uploaded.iter().map(|u| u.2).collect::<Vec<_>>(), vec![0, 0]);
    assert!(gpu.calls().contains(&Call::Draw));
    assert_eq!(gpu.uniforms().num_primitives, 0);
    assert_eq!(gpu.uniforms().num_lights, 0);
    assert_eq!(gpu.uniforms().light_intensity, 0.0);
    assert_eq!(gpu.live_buffers(), 0);
    Ok(())
}

#[test]
fn each_buffer_follows_upload_bind_draw_release() -> anyhow::Result<()> {
    let scene = DemoScene::Fractals.build();
    let cam = camera();
    let mut renderer = renderer();

    for _ in 0..3 {
        renderer.backend_mut().clear_calls();
        renderer.render_frame(&scene, Some(&cam))?;
        let calls = renderer.backend().calls();

        let draws: Vec<_> = calls.iter().enumerate().filter(|(_, c)| **c == Call::Draw).collect();
        assert_eq!(draws.len(), 1);
        let draw_at = draws[0].0;

        for (id, _, _) in uploads(calls) {
            let upload_at = position(calls, |c| matches!(c, Call::Upload { buffer, .. } if *buffer == id));
            let bind_at = position(calls, |c| matches!(c, Call::Bind { buffer, .. } if *buffer == id));
            let release_at = position(calls, |c| matches!(c, Call::Release { buffer } if *buffer == id));
            assert!(upload_at < bind_at && bind_at < draw_at && draw_at < release_at);
            let releases = calls
                .iter()
                .filter(|c| matches!(c, Call::Release { buffer } if *buffer == id))
                .count();
            assert_eq!(releases, 1);
        }
    }
    assert_eq!(renderer.frames_drawn(), 3);
    assert_eq!(renderer.backend().live_buffers(), 0);
    Ok(())
}

#[test]
fn released_buffers_cannot_be_reused() -> anyhow::Result<()> {
    let scene = DemoScene::Basic.build();
    let cam = camera();
    let mut renderer = renderer();
    renderer.render_frame(&scene, Some(&cam))?;

    let gpu = renderer.backend_mut();
    let (stale, _, _) = uploads(gpu.calls())[0].clone();
    assert!(gpu.is_released(stale));
    assert_eq!(
        gpu.bind_buffer(layout::PRIMITIVE_BUFFER, stale),
        Err(GpuError::UseAfterRelease(stale))
    );
    assert_eq!(gpu.release_buffer(stale), Err(GpuError::UseAfterRelease(stale)));
    Ok(())
}

#[test]
fn degenerate_camera_skips_draw_and_releases() -> anyhow::Result<()> {
    let scene = DemoScene::Basic.build();
    let mut renderer = renderer();

    let flat = Camera::new(800, 0);
    let outcome = renderer.render_frame(&scene, Some(&flat))?;
    assert_eq!(outcome, FrameOutcome::Skipped(DegenerateCamera::InvalidAspect(0.0)));

    let outcome = renderer.render_frame(&scene, None)?;
    assert_eq!(outcome, FrameOutcome::Skipped(DegenerateCamera::MissingViewpoint));

    let gpu = renderer.backend();
    assert!(!gpu.calls().contains(&Call::Draw));
    assert_eq!(uploads(gpu.calls()).len(), 4);
    assert_eq!(gpu.live_buffers(), 0);

    // recovers on the next good frame
    let cam = camera();
    let outcome = renderer.render_frame(&scene, Some(&cam))?;
    assert!(matches!(outcome, FrameOutcome::Drawn { .. }));
    Ok(())
}

#[test]
fn draw_failure_still_releases_buffers() {
    let scene = DemoScene::Basic.build();
    let cam = camera();
    let mut renderer = renderer();
    renderer.backend_mut().fail_next_draw = true;

    let err = renderer.render_frame(&scene, Some(&cam)).unwrap_err();
    assert!(matches!(err, RenderError::Gpu(GpuError::DrawFailed(_))));
    assert_eq!(renderer.backend().live_buffers(), 0);

    assert!(renderer.render_frame(&scene, Some(&cam)).is_ok());
}

#[test]
fn shader_stride_mismatch_fails_fast() {
    let gpu = MockGpu::new().with_stride(layout::PRIMITIVE_BUFFER, 80);
    let mut renderer = FrameRenderer::new(gpu, RendererConfig::default());

    let err = renderer.initialize().unwrap_err();
    assert_eq!(
        err,
        RenderError::LayoutMismatch { slot: layout::PRIMITIVE_BUFFER.into(), host: 68, device: 80 }
    );
    assert_eq!(renderer.state(), RendererState::Uninitialized);
    assert_eq!(renderer.backend().live_buffers(), 0);
}

#[test]
fn legacy_light_uniforms_can_be_disabled() -> anyhow::Result<()> {
    let scene = DemoScene::Basic.build();
    let cam = camera();
    let gpu = MockGpu::from_shader(render::shader::SOURCE)?;
    let mut renderer = FrameRenderer::new(gpu, RendererConfig { legacy_light_uniforms: false });
    renderer.render_frame(&scene, Some(&cam))?;

    let gpu = renderer.backend();
    assert!(!gpu
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Uniform { slot, .. } if slot == layout::LIGHT_POS)));
    assert_eq!(gpu.uniforms().num_lights, 1);
    Ok(())
}

#[test]
fn counts_are_written_as_ints() -> anyhow::Result<()> {
    let scene = DemoScene::Fractals.build();
    let cam = camera();
    let mut renderer = renderer();
    renderer.render_frame(&scene, Some(&cam))?;
    let counts: Vec<_> = renderer
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::Uniform { slot, value } if slot == layout::NUM_PRIMITIVES || slot == layout::NUM_LIGHTS => {
                Some(*value)
            }
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![UniformValue::Int(6), UniformValue::Int(2)]);
    Ok(())
}
