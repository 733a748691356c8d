#![deny(clippy::all, clippy::pedantic)]
//! # raymarch
//!
//! Renders one of the built-in demo scenes with the ray-marching pipeline,
//! either offscreen to a PNG (`headless`, the default) or in an interactive
//! window (`window`, WASD to move, left-drag to look, Esc to quit).

mod config;
mod headless;
mod window;

use anyhow::Result;
use clap::Parser;

use crate::config::{Args, Mode};

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();
    args.validate()?;

    tracing::info!(mode = ?args.mode, scene = %args.scene, width = args.width, height = args.height, "starting");
    match args.mode {
        Mode::Headless => headless::run(&args),
        Mode::Window => window::run(&args),
    }
}
