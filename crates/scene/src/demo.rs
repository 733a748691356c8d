//! Built-in scenes for the runtime and benchmarks.

use std::fmt;
use std::str::FromStr;

use glam::{Vec3, Vec4};

use crate::provider::Scene;
use crate::types::{Light, Phong, Primitive, PrimitiveKind};
use crate::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoScene {
    /// One red sphere and one light.
    Basic,
    /// Sphere, cube and one of each fractal kind under two lights.
    Fractals,
    Empty,
}

impl DemoScene {
    pub const ALL: [DemoScene; 3] = [DemoScene::Basic, DemoScene::Fractals, DemoScene::Empty];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DemoScene::Basic => "basic",
            DemoScene::Fractals => "fractals",
            DemoScene::Empty => "empty",
        }
    }

    /// Eye position and look-at target that frame the scene.
    #[must_use]
    pub fn framing(self) -> (Vec3, Vec3) {
        match self {
            DemoScene::Basic | DemoScene::Empty => (Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)),
            DemoScene::Fractals => (Vec3::new(0.0, 3.0, -9.0), Vec3::new(0.0, 0.5, 0.0)),
        }
    }

    #[must_use]
    pub fn build(self) -> Scene {
        let mut scene = Scene::new();
        match self {
            DemoScene::Basic => {
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Sphere, Vec3::new(0.0, 0.0, 5.0))
                        .with_color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
                );
                scene.add_light(Light::new(Vec3::new(0.0, 5.0, 0.0), 2.0));
            }
            DemoScene::Fractals => {
                let glossy = Phong::new(0.15, 0.75, 0.6);
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Sphere, Vec3::new(-4.5, 0.0, 0.0))
                        .with_color(Vec4::new(0.9, 0.2, 0.2, 1.0))
                        .with_phong(glossy),
                );
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Cube, Vec3::new(-1.5, 0.0, 3.0))
                        .with_scale(Vec3::new(0.8, 0.8, 0.8))
                        .with_color(Vec4::new(0.2, 0.6, 0.9, 1.0)),
                );
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Menger, Vec3::new(1.5, 0.0, 3.0))
                        .with_color(Vec4::new(0.85, 0.85, 0.8, 1.0)),
                );
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Sierpinski, Vec3::new(4.5, 0.0, 0.0))
                        .with_color(Vec4::new(0.9, 0.7, 0.2, 1.0)),
                );
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Mandelbulb, Vec3::new(-1.5, 0.0, -2.0))
                        .with_scale(Vec3::splat(1.2))
                        .with_color(Vec4::new(0.6, 0.4, 0.9, 1.0))
                        .with_orbit_trap(true),
                );
                scene.add_primitive(
                    Primitive::new(PrimitiveKind::Julia, Vec3::new(1.5, 0.0, -2.0))
                        .with_scale(Vec3::splat(1.2))
                        .with_color(Vec4::new(0.3, 0.9, 0.5, 1.0))
                        .with_orbit_trap(true),
                );
                scene.add_light(Light::new(Vec3::new(0.0, 8.0, -6.0), 1.5));
                scene.add_light(Light::new(Vec3::new(-6.0, 4.0, 4.0), 0.6));
            }
            DemoScene::Empty => {}
        }
        tracing::debug!(
            scene = self.name(),
            primitives = scene.primitive_count(),
            lights = scene.light_count(),
            "built demo scene"
        );
        scene
    }
}

impl fmt::Display for DemoScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoScene {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|demo| demo.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SceneError::UnknownDemo(s.to_owned()))
    }
}
