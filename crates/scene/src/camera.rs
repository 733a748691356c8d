//! Camera and viewpoint
//!
//! [`Viewpoint`] is the renderer's view of a camera. [`Camera`] keeps its
//! orientation as yaw and pitch with the pitch clamped short of the poles,
//! and builds a quaternion from them each time it is asked. Look deltas are
//! added to the angles, never to a rotation matrix, so there is no gimbal
//! flip when looking straight up or down.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Quat, Vec3, Vec4};

/// Pitch stays this far away from +-90 degrees.
const PITCH_MARGIN: f32 = 1.0e-3;

pub trait Viewpoint {
    /// Vertical field of view in radians.
    fn vertical_fov(&self) -> f32;
    /// Viewport width divided by height.
    fn aspect(&self) -> f32;
    fn projection(&self) -> Mat4;
    fn camera_to_world(&self) -> Mat4;
    /// Colour of rays that miss every surface.
    fn background_color(&self) -> Vec4;
}

/// Simple perspective camera used by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Rotation about world Y, radians.
    yaw: f32,
    /// Rotation about the camera's X axis, radians.
    pitch: f32,
    /// Field of view in radians.
    pub fovy: f32,
    /// Render target aspect ratio.
    pub aspect: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    pub background: Vec4,
}

impl Camera {
    /// Camera at the origin looking down -Z.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fovy: 60.0f32.to_radians(),
            aspect: aspect_ratio(width, height),
            znear: 0.1,
            zfar: 100.0,
            background: Vec4::new(0.05, 0.06, 0.09, 1.0),
        }
    }

    /// Places the camera at `eye` facing `target`.
    #[must_use]
    pub fn looking_at(mut self, eye: Vec3, target: Vec3) -> Self {
        self.eye = eye;
        let forward = (target - eye).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.yaw = (-forward.x).atan2(-forward.z);
            self.pitch = forward.y.clamp(-1.0, 1.0).asin();
            self.clamp_pitch();
        }
        self
    }

    #[must_use]
    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.fovy = degrees.to_radians();
        self
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Update aspect ratio when the render target is resized
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    #[must_use]
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    /// Applies look deltas in radians. Yaw wraps, pitch is clamped.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
        self.pitch += delta_pitch;
        self.clamp_pitch();
    }

    /// Moves by `delta` expressed in camera space (x right, y up, -z forward).
    pub fn translate_local(&mut self, delta: Vec3) {
        self.eye += self.orientation() * delta;
    }

    fn clamp_pitch(&mut self) {
        let limit = FRAC_PI_2 - PITCH_MARGIN;
        self.pitch = self.pitch.clamp(-limit, limit);
    }
}

impl Viewpoint for Camera {
    fn vertical_fov(&self) -> f32 {
        self.fovy
    }

    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    fn camera_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.eye)
    }

    fn background_color(&self) -> Vec4 {
        self.background
    }
}

#[allow(clippy::cast_precision_loss)]
fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        0.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_points_forward_at_target() {
        let cam = Camera::new(800, 600).looking_at(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0));
        assert!((cam.forward() - Vec3::Z).length() < 1e-5, "forward = {:?}", cam.forward());
    }

    #[test]
    fn pitch_is_clamped_and_never_flips() {
        let mut cam = Camera::new(800, 600);
        for _ in 0..100 {
            cam.rotate(0.0, 0.1);
            assert!(cam.up().y > 0.0, "camera flipped at pitch {}", cam.pitch());
        }
        assert!(cam.pitch() < FRAC_PI_2);
        assert!(cam.forward().y > 0.99);

        for _ in 0..200 {
            cam.rotate(0.05, -0.1);
            assert!(cam.up().y > 0.0, "camera flipped at pitch {}", cam.pitch());
        }
        assert!(cam.pitch() > -FRAC_PI_2);
    }

    #[test]
    fn zero_height_gives_zero_aspect() {
        let cam = Camera::new(800, 0);
        assert_eq!(cam.aspect(), 0.0);
    }

    #[test]
    fn camera_to_world_carries_eye() {
        let cam = Camera::new(1, 1).looking_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let origin = cam.camera_to_world().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }
}
