#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Scene model
//!
//! The live state the ray-marching renderer reads every frame.
//!
//! ## Key Components
//!
//! -   **Primitives:** [`Primitive`] describes one implicit surface. Its
//!     [`PrimitiveKind`] is a closed set whose declaration order is the integer
//!     tag the shader dispatches on.
//! -   **Lights:** [`Light`] is a point light with a scalar intensity.
//! -   **Viewpoint:** [`Viewpoint`] is what the renderer needs from a camera.
//!     [`Camera`] implements it with a clamped yaw/pitch orientation, so look
//!     input near straight up or down never flips the view.
//! -   **Discovery:** [`SceneProvider`] hands out the currently active
//!     primitives and lights. [`Scene`] is the in-memory implementation.
//!
//! ```rust,ignore
//! use scene::{Light, Primitive, PrimitiveKind, Scene};
//! use glam::Vec3;
//!
//! let mut scene = Scene::new();
//! scene.add_primitive(Primitive::new(PrimitiveKind::Sphere, Vec3::new(0.0, 0.0, 5.0)));
//! scene.add_light(Light::new(Vec3::new(0.0, 5.0, 0.0), 2.0));
//! ```

pub mod camera;
pub mod demo;
pub mod provider;
pub mod types;

pub use camera::{Camera, Viewpoint};
pub use demo::DemoScene;
pub use provider::{LightId, PrimitiveId, Scene, SceneProvider};
pub use types::{Light, Phong, Primitive, PrimitiveKind};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown demo scene `{0}`")]
    UnknownDemo(String),
}
