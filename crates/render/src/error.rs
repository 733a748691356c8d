use gpu::{BufferId, GpuError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("layout mismatch on `{slot}`: host stride {host} bytes, shader stride {device} bytes")]
    LayoutMismatch {
        slot: String,
        host: usize,
        device: usize,
    },
    #[error("buffer {0:?} released before the draw that reads it")]
    ReleaseBeforeDraw(BufferId),
    #[error("{0} elements do not fit an i32 count")]
    TooManyElements(usize),
}

/// Camera state from which no rays can be generated this frame.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DegenerateCamera {
    #[error("no viewpoint")]
    MissingViewpoint,
    #[error("aspect ratio {0} is not positive")]
    InvalidAspect(f32),
    #[error("field of view {0} rad is outside (0, pi)")]
    InvalidFov(f32),
    #[error("projection matrix is singular")]
    SingularProjection,
    #[error("camera-to-world transform is not finite")]
    NonFiniteTransform,
}
