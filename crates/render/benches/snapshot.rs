use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use gpu::MockGpu;
use render::{FrameRenderer, RendererConfig, Snapshot};
use scene::{Camera, DemoScene, Light, Primitive, PrimitiveKind, Scene};

fn large_scene(n: usize) -> Scene {
    let mut scene = Scene::new();
    for i in 0..n {
        let kind = PrimitiveKind::ALL[i % PrimitiveKind::ALL.len()];
        #[allow(clippy::cast_precision_loss)]
        let x = i as f32;
        scene.add_primitive(Primitive::new(kind, Vec3::new(x, 0.0, 5.0)));
    }
    scene.add_light(Light::new(Vec3::new(0.0, 10.0, 0.0), 1.0));
    scene
}

fn bench_snapshot(c: &mut Criterion) {
    let scene = large_scene(1024);
    c.bench_function("snapshot_1024", |b| b.iter(|| Snapshot::build(black_box(&scene))));
}

fn bench_frame(c: &mut Criterion) {
    let scene = DemoScene::Fractals.build();
    let camera = Camera::new(1280, 720);
    let mut renderer = FrameRenderer::new(MockGpu::new(), RendererConfig::default());
    c.bench_function("mock_frame_fractals", |b| {
        b.iter(|| {
            renderer.backend_mut().clear_calls();
            renderer.render_frame(&scene, Some(&camera)).unwrap()
        });
    });
}

criterion_group!(benches, bench_snapshot, bench_frame);
criterion_main!(benches);
