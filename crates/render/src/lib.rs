#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Scene-to-GPU pipeline
//!
//! Turns a live scene into the buffers and uniforms consumed by the
//! ray-marching shader, once per frame.
//!
//! ## Key Components
//!
//! -   **Records:** [`PrimitiveGpu`] and [`LightGpu`] are the byte-exact
//!     storage layouts, built from `scene` types.
//! -   **Rays:** [`RayParams`] derives field of view and the camera-to-world
//!     and inverse projection matrices from a `scene::Viewpoint`.
//! -   **Snapshot:** [`Snapshot`] collects the provider's active instances.
//! -   **Buffers:** [`FrameBuffers`] scopes buffer lifetime to one frame.
//! -   **Orchestrator:** [`FrameRenderer`] runs the whole sequence against a
//!     `gpu::RenderBackend`.
//!
//! ```rust,ignore
//! use render::{FrameRenderer, RendererConfig};
//! use scene::{Camera, DemoScene};
//!
//! let scene = DemoScene::Basic.build();
//! let camera = Camera::new(1280, 720);
//! let mut renderer = FrameRenderer::new(backend, RendererConfig::default());
//! renderer.render_frame(&scene, Some(&camera))?;
//! ```

pub mod buffers;
pub mod camera;
pub mod error;
pub mod frame;
pub mod gpu_types;
pub mod scene;
pub mod shader;

pub use buffers::{BufferHandle, FrameBuffers};
pub use camera::{horizontal_fov, RayParams};
pub use error::{DegenerateCamera, RenderError};
pub use frame::{FrameOutcome, FrameRenderer, RendererConfig, RendererState};
pub use gpu_types::{GpuRecord, LightGpu, PrimitiveGpu};
pub use self::scene::Snapshot;
