//! Command-line configuration.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use render::RendererConfig;
use scene::{Camera, DemoScene};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Render offscreen and write a PNG.
    Headless,
    /// Open an interactive window.
    Window,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "raymarch", version, about = "Ray-marched implicit surface renderer")]
pub struct Args {
    #[arg(value_enum, default_value_t = Mode::Headless)]
    pub mode: Mode,

    /// Image or window width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Image or window height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames to render before saving (headless only).
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// PNG path. Defaults to a timestamped file in the working directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Vertical field of view in degrees.
    #[arg(long, default_value_t = 60.0)]
    pub fov: f32,

    /// Demo scene: basic, fractals or empty.
    #[arg(long, default_value = "basic")]
    pub scene: DemoScene,

    /// Do not fill the single-light uniforms from the first light.
    #[arg(long)]
    pub no_legacy_light: bool,

    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

impl Args {
    /// Rejects values that can never produce an image.
    ///
    /// # Errors
    ///
    /// Zero-sized output or a field of view outside (0, 180) degrees.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "image size must be non-zero, got {}x{}", self.width, self.height);
        ensure!(
            self.fov > 0.0 && self.fov < 180.0,
            "field of view must be between 0 and 180 degrees, got {}",
            self.fov
        );
        Ok(())
    }

    #[must_use]
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig { legacy_light_uniforms: !self.no_legacy_light }
    }

    /// Camera framing the selected scene.
    #[must_use]
    pub fn camera(&self) -> Camera {
        let (eye, target) = self.scene.framing();
        Camera::new(self.width, self.height)
            .with_fov_degrees(self.fov)
            .looking_at(eye, target)
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("raymarch_{}_{stamp}.png", self.scene))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::Viewpoint;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("raymarch").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.mode, Mode::Headless);
        assert_eq!((args.width, args.height), (1280, 720));
        assert_eq!(args.scene, DemoScene::Basic);
        assert_eq!(args.log_level, Level::INFO);
        assert!(args.renderer_config().legacy_light_uniforms);
        args.validate().unwrap();
    }

    #[test]
    fn window_mode_with_options() {
        let args = parse(&[
            "window",
            "--width",
            "640",
            "--height",
            "480",
            "--scene",
            "fractals",
            "--fov",
            "75",
            "--no-legacy-light",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Window);
        assert_eq!(args.scene, DemoScene::Fractals);
        assert_eq!(args.log_level, Level::DEBUG);
        assert!(!args.renderer_config().legacy_light_uniforms);

        let camera = args.camera();
        assert!((camera.aspect() - 640.0 / 480.0).abs() < 1e-6);
        assert!((camera.vertical_fov() - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.eye, DemoScene::Fractals.framing().0);
    }

    #[test]
    fn unknown_scene_is_rejected() {
        assert!(parse(&["--scene", "teapot"]).is_err());
    }

    #[test]
    fn degenerate_sizes_fail_validation() {
        assert!(parse(&["--height", "0"]).unwrap().validate().is_err());
        assert!(parse(&["--fov", "180"]).unwrap().validate().is_err());
    }

    #[test]
    fn explicit_output_path_wins() {
        let args = parse(&["--output", "out.png"]).unwrap();
        assert_eq!(args.output_path(), PathBuf::from("out.png"));
        let generated = parse(&[]).unwrap().output_path();
        assert!(generated.to_string_lossy().starts_with("raymarch_basic_"));
    }
}
