//! Reads buffer layouts back out of a WGSL program.
//!
//! The ray-marching program is the authority on how it indexes its storage
//! arrays. Parsing it with naga gives the device-side element stride for each
//! storage slot and the member offsets of the uniform block, so a host struct
//! that drifts from the shader is caught before any data is uploaded.

use std::collections::HashMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, TypeInner};

use crate::layout::FRAME_BLOCK;
use crate::GpuError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderLayout {
    strides: HashMap<String, u32>,
    uniform_offsets: HashMap<String, u32>,
    uniform_size: u32,
}

impl ShaderLayout {
    /// Parses and validates `source`, then collects its layouts.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::Shader`] with a rendered diagnostic if the program
    /// fails to parse or validate.
    pub fn from_wgsl(source: &str) -> Result<Self, GpuError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| GpuError::Shader(e.emit_to_string(source)))?;
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        validator
            .validate(&module)
            .map_err(|e| GpuError::Shader(e.emit_to_string(source)))?;

        let mut layout = Self::default();
        for (_, var) in module.global_variables.iter() {
            let Some(name) = var.name.as_deref() else {
                continue;
            };
            match (var.space, &module.types[var.ty].inner) {
                (AddressSpace::Storage { .. }, TypeInner::Array { stride, .. }) => {
                    layout.strides.insert(name.to_owned(), *stride);
                }
                (AddressSpace::Uniform, TypeInner::Struct { members, span }) if name == FRAME_BLOCK => {
                    layout.uniform_size = *span;
                    for member in members {
                        if let Some(member_name) = &member.name {
                            layout.uniform_offsets.insert(member_name.clone(), member.offset);
                        }
                    }
                }
                _ => {}
            }
        }
        tracing::debug!(
            storage = layout.strides.len(),
            uniforms = layout.uniform_offsets.len(),
            "reflected shader layout"
        );
        Ok(layout)
    }

    /// Element stride of a runtime-sized storage array.
    #[must_use]
    pub fn stride(&self, slot: &str) -> Option<usize> {
        self.strides.get(slot).map(|&s| s as usize)
    }

    /// Byte offset of a member of the uniform block.
    #[must_use]
    pub fn uniform_offset(&self, slot: &str) -> Option<usize> {
        self.uniform_offsets.get(slot).map(|&o| o as usize)
    }

    /// Total size of the uniform block in bytes, 0 if the program has none.
    #[must_use]
    pub fn uniform_size(&self) -> usize {
        self.uniform_size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r"
struct Item {
    a: array<f32, 3>,
    b: i32,
}

struct FrameUniforms {
    m: mat4x4<f32>,
    n: i32,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(0) @binding(1) var<storage, read> items: array<Item>;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let first = items[0];
    return vec4<f32>(first.a[0], f32(frame.n), 0.0, 1.0);
}
";

    #[test]
    fn reads_storage_stride() {
        let layout = ShaderLayout::from_wgsl(SRC).unwrap();
        assert_eq!(layout.stride("items"), Some(16));
        assert_eq!(layout.stride("missing"), None);
    }

    #[test]
    fn reads_uniform_offsets() {
        let layout = ShaderLayout::from_wgsl(SRC).unwrap();
        assert_eq!(layout.uniform_offset("m"), Some(0));
        assert_eq!(layout.uniform_offset("n"), Some(64));
        assert_eq!(layout.uniform_size(), 80);
    }

    #[test]
    fn rejects_invalid_source() {
        let err = ShaderLayout::from_wgsl("fn broken( {").unwrap_err();
        assert!(matches!(err, GpuError::Shader(_)));
    }
}
