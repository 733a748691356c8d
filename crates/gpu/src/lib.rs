#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # GPU backend abstraction
//!
//! A thin layer between the ray-marching pipeline and the graphics device. The
//! [`RenderBackend`] trait exposes exactly what a frame needs from a shader
//! program: named storage buffers, named uniforms and a single full-screen
//! draw. Buffer lifetime is explicit so the caller can scope it to one frame.
//!
//! Two implementations ship with the crate:
//!
//! -   [`MockGpu`] (feature `mock`) records every call and tracks released
//!     buffers, which lets tests assert ordering and catch use-after-release.
//! -   [`WgpuBackend`] (feature `gpu`) drives a real `wgpu` device.
//!
//! The slot names shared with the WGSL program live in [`layout`], and
//! [`reflect`] reads the compiled program's expected strides back out of the
//! shader source.

use thiserror::Error;

pub mod backend;
pub mod layout;
pub mod reflect;

#[cfg(feature = "gpu")]
pub mod pipeline;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

pub use backend::RenderBackend;
#[cfg(feature = "mock")]
pub use backend::mock::{Call, MockGpu};
pub use layout::FrameUniforms;
pub use reflect::ShaderLayout;
#[cfg(feature = "gpu")]
pub use wgpu_backend::WgpuBackend;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GpuError {
    #[error("buffer {0:?} used after release")]
    UseAfterRelease(BufferId),
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
    #[error("no resource slot named `{0}`")]
    UnknownSlot(String),
    #[error("uniform `{slot}` expects {expected}, got {got}")]
    UniformType {
        slot: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("buffer data is {len} bytes, expected {count} x {stride}")]
    StrideMismatch { len: usize, count: usize, stride: usize },
    #[error("slot `{slot}` expects {device}-byte elements, buffer has {host}-byte elements")]
    SlotStride { slot: String, host: usize, device: usize },
    #[error("shader error: {0}")]
    Shader(String),
    #[error("no render target set")]
    NoTarget,
    #[error("backend not available")]
    BackendUnavailable,
    #[error("draw failed: {0}")]
    DrawFailed(String),
}

/// Identifier of a buffer allocated by a [`RenderBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// A value written to a named uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "i32",
            UniformValue::Float(_) => "f32",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
            UniformValue::Mat4(_) => "mat4x4<f32>",
        }
    }
}
