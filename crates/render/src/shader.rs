//! The ray-marching WGSL program.

use gpu::{GpuError, ShaderLayout};

/// Source of the full-screen ray-marching program (`vs_main` / `fs_main`).
pub const SOURCE: &str = include_str!("raymarch.wgsl");

/// Parses and validates [`SOURCE`] and returns its buffer layouts.
///
/// # Errors
///
/// Returns [`GpuError::Shader`] if the program does not validate.
pub fn layout() -> Result<ShaderLayout, GpuError> {
    ShaderLayout::from_wgsl(SOURCE)
}
