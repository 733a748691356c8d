//! Ray-generation parameters derived from a [`Viewpoint`].

use std::f32::consts::PI;

use glam::Mat4;
use gpu::{layout, UniformValue};
use scene::Viewpoint;

use crate::error::DegenerateCamera;

/// Per-frame inputs for turning a pixel into a world-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayParams {
    /// Horizontal field of view, radians.
    pub h_fov: f32,
    /// Vertical field of view, radians.
    pub v_fov: f32,
    pub cam_to_world: Mat4,
    /// Image (clip) space to camera space.
    pub inv_projection: Mat4,
}

impl RayParams {
    /// Reads the viewpoint's current state. Nothing is cached between calls.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateCamera`] when the aspect ratio or field of view is
    /// out of range, or when the projection cannot be inverted.
    pub fn derive(viewpoint: &dyn Viewpoint) -> Result<Self, DegenerateCamera> {
        let aspect = viewpoint.aspect();
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(DegenerateCamera::InvalidAspect(aspect));
        }
        let v_fov = viewpoint.vertical_fov();
        if !v_fov.is_finite() || v_fov <= 0.0 || v_fov >= PI {
            return Err(DegenerateCamera::InvalidFov(v_fov));
        }

        let projection = viewpoint.projection();
        let det = projection.determinant();
        if !det.is_finite() || det.abs() < f32::MIN_POSITIVE {
            return Err(DegenerateCamera::SingularProjection);
        }
        let inv_projection = projection.inverse();
        if !inv_projection.is_finite() {
            return Err(DegenerateCamera::SingularProjection);
        }

        let cam_to_world = viewpoint.camera_to_world();
        if !cam_to_world.is_finite() {
            return Err(DegenerateCamera::NonFiniteTransform);
        }

        Ok(Self {
            h_fov: horizontal_fov(v_fov, aspect),
            v_fov,
            cam_to_world,
            inv_projection,
        })
    }

    /// Uniform writes that carry these parameters to the shader.
    #[must_use]
    pub fn uniforms(&self) -> [(&'static str, UniformValue); 4] {
        [
            (layout::H_FOV, UniformValue::Float(self.h_fov)),
            (layout::V_FOV, UniformValue::Float(self.v_fov)),
            (layout::CAM_TO_WORLD, UniformValue::Mat4(self.cam_to_world.to_cols_array_2d())),
            (layout::IMAGE_TO_CAM, UniformValue::Mat4(self.inv_projection.to_cols_array_2d())),
        ]
    }
}

/// Horizontal field of view for a vertical one at the given aspect ratio.
#[must_use]
pub fn horizontal_fov(v_fov: f32, aspect: f32) -> f32 {
    2.0 * ((v_fov * 0.5).tan() * aspect).atan()
}
