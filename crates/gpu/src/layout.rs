//! Names and binding indices shared with the WGSL program.
//!
//! The string constants are the wire contract between host and shader: storage
//! slots are global variable names, uniform slots are member names of the
//! `FrameUniforms` block. [`FrameUniforms`] is the host mirror of that block.

use bytemuck::{Pod, Zeroable};
use std::mem::offset_of;

use crate::{GpuError, UniformValue};

pub const PRIMITIVE_BUFFER: &str = "primitiveBuffer";
pub const LIGHT_BUFFER: &str = "lightBuffer";

pub const NUM_PRIMITIVES: &str = "numPrimitives";
pub const NUM_LIGHTS: &str = "numLights";
pub const BACKGROUND_COLOR: &str = "backgroundColor";
pub const H_FOV: &str = "hFov";
pub const V_FOV: &str = "vFov";
pub const CAM_TO_WORLD: &str = "c2w";
pub const IMAGE_TO_CAM: &str = "i2c";
pub const LIGHT_POS: &str = "lightPos";
pub const LIGHT_INTENSITY: &str = "lightIntensity";

/// Name of the uniform block variable in the WGSL program.
pub const FRAME_BLOCK: &str = "frame";

pub const FRAME_BINDING: u32 = 0;
pub const PRIMITIVE_BINDING: u32 = 1;
pub const LIGHT_BINDING: u32 = 2;

pub const STORAGE_SLOTS: [&str; 2] = [PRIMITIVE_BUFFER, LIGHT_BUFFER];

/// Uniform members in declaration order.
pub const UNIFORM_SLOTS: [&str; 9] = [
    CAM_TO_WORLD,
    IMAGE_TO_CAM,
    BACKGROUND_COLOR,
    LIGHT_POS,
    LIGHT_INTENSITY,
    H_FOV,
    V_FOV,
    NUM_PRIMITIVES,
    NUM_LIGHTS,
];

/// Binding index of a storage slot.
#[must_use]
pub fn storage_binding(slot: &str) -> Option<u32> {
    match slot {
        PRIMITIVE_BUFFER => Some(PRIMITIVE_BINDING),
        LIGHT_BUFFER => Some(LIGHT_BINDING),
        _ => None,
    }
}

/// Host mirror of the WGSL `FrameUniforms` block (176 bytes).
///
/// `light_pos` is a `vec3<f32>` on the device; `light_intensity` fills the
/// fourth lane of the same 16-byte row, so no explicit padding is needed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub c2w: [[f32; 4]; 4],
    pub i2c: [[f32; 4]; 4],
    pub background_color: [f32; 4],
    pub light_pos: [f32; 3],
    pub light_intensity: f32,
    pub h_fov: f32,
    pub v_fov: f32,
    pub num_primitives: i32,
    pub num_lights: i32,
}

const _: () = assert!(std::mem::size_of::<FrameUniforms>() == 176);

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl FrameUniforms {
    /// Writes `value` into the member named `slot`.
    ///
    /// # Errors
    ///
    /// [`GpuError::UnknownSlot`] for names outside the block and
    /// [`GpuError::UniformType`] when the value has the wrong shape.
    pub fn set(&mut self, slot: &str, value: UniformValue) -> Result<(), GpuError> {
        match (slot, value) {
            (CAM_TO_WORLD, UniformValue::Mat4(m)) => self.c2w = m,
            (IMAGE_TO_CAM, UniformValue::Mat4(m)) => self.i2c = m,
            (BACKGROUND_COLOR, UniformValue::Vec4(c)) => self.background_color = c,
            (LIGHT_POS, UniformValue::Vec3(p)) => self.light_pos = p,
            (LIGHT_INTENSITY, UniformValue::Float(v)) => self.light_intensity = v,
            (H_FOV, UniformValue::Float(v)) => self.h_fov = v,
            (V_FOV, UniformValue::Float(v)) => self.v_fov = v,
            (NUM_PRIMITIVES, UniformValue::Int(n)) => self.num_primitives = n,
            (NUM_LIGHTS, UniformValue::Int(n)) => self.num_lights = n,
            _ => {
                let expected = Self::type_of(slot).ok_or_else(|| GpuError::UnknownSlot(slot.to_owned()))?;
                return Err(GpuError::UniformType {
                    slot: slot.to_owned(),
                    expected,
                    got: value.type_name(),
                });
            }
        }
        Ok(())
    }

    /// WGSL type of a uniform member.
    #[must_use]
    pub fn type_of(slot: &str) -> Option<&'static str> {
        Some(match slot {
            CAM_TO_WORLD | IMAGE_TO_CAM => "mat4x4<f32>",
            BACKGROUND_COLOR => "vec4<f32>",
            LIGHT_POS => "vec3<f32>",
            LIGHT_INTENSITY | H_FOV | V_FOV => "f32",
            NUM_PRIMITIVES | NUM_LIGHTS => "i32",
            _ => return None,
        })
    }

    /// Byte offset of a uniform member inside the block.
    #[must_use]
    pub fn offset(slot: &str) -> Option<usize> {
        Some(match slot {
            CAM_TO_WORLD => offset_of!(FrameUniforms, c2w),
            IMAGE_TO_CAM => offset_of!(FrameUniforms, i2c),
            BACKGROUND_COLOR => offset_of!(FrameUniforms, background_color),
            LIGHT_POS => offset_of!(FrameUniforms, light_pos),
            LIGHT_INTENSITY => offset_of!(FrameUniforms, light_intensity),
            H_FOV => offset_of!(FrameUniforms, h_fov),
            V_FOV => offset_of!(FrameUniforms, v_fov),
            NUM_PRIMITIVES => offset_of!(FrameUniforms, num_primitives),
            NUM_LIGHTS => offset_of!(FrameUniforms, num_lights),
            _ => return None,
        })
    }
}
