//! GPU record layouts
//!
//! Host-side mirrors of the `Primitive` and `Light` structs in the WGSL
//! program. Every field is a 4-byte scalar or an array of them, so the packed
//! `#[repr(C)]` size is also the device stride. The field tables below are
//! the declared layout; a compile-time assertion ties each table to the Rust
//! struct it describes.

use bytemuck::{Pod, Zeroable};
use gpu::layout;
use scene::{Light, Primitive};

const F32: usize = std::mem::size_of::<f32>();
const I32: usize = std::mem::size_of::<i32>();

/// A fixed-layout record stored in a shader storage array.
pub trait GpuRecord: Pod {
    /// Debug label for buffers holding this record.
    const LABEL: &'static str;
    /// Storage slot the records are bound to.
    const SLOT: &'static str;
    /// Uniform slot that carries the element count.
    const COUNT_SLOT: &'static str;
    /// Field names and byte widths in declaration order.
    const FIELDS: &'static [(&'static str, usize)];

    /// Element size in bytes, summed from [`GpuRecord::FIELDS`].
    #[must_use]
    fn size_of() -> usize {
        declared_size(Self::FIELDS)
    }

    /// Byte offset of a named field.
    #[must_use]
    fn offset_of(field: &str) -> Option<usize> {
        let mut offset = 0;
        for &(name, width) in Self::FIELDS {
            if name == field {
                return Some(offset);
            }
            offset += width;
        }
        None
    }
}

#[must_use]
pub const fn declared_size(fields: &[(&str, usize)]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].1;
        i += 1;
    }
    total
}

/// GPU representation of one implicit-surface primitive (68 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PrimitiveGpu {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    /// [`scene::PrimitiveKind`] discriminant.
    pub kind: i32,
    pub color: [f32; 4],
    /// Ambient, diffuse, specular.
    pub phong: [f32; 3],
    pub iteration_bounds: [f32; 2],
    /// 1.0 when orbit-trap colouring is on.
    pub orbit_trap: f32,
}

impl GpuRecord for PrimitiveGpu {
    const LABEL: &'static str = "primitives";
    const SLOT: &'static str = layout::PRIMITIVE_BUFFER;
    const COUNT_SLOT: &'static str = layout::NUM_PRIMITIVES;
    const FIELDS: &'static [(&'static str, usize)] = &[
        ("position", 3 * F32),
        ("scale", 3 * F32),
        ("kind", I32),
        ("color", 4 * F32),
        ("phongParams", 3 * F32),
        ("iterationBounds", 2 * F32),
        ("orbitTrap", F32),
    ];
}

const _: () = assert!(std::mem::size_of::<PrimitiveGpu>() == declared_size(PrimitiveGpu::FIELDS));

impl From<&Primitive> for PrimitiveGpu {
    fn from(primitive: &Primitive) -> Self {
        // simple kinds leave the fractal-only fields zeroed
        let (iteration_bounds, orbit_trap) = if primitive.kind.is_fractal() {
            (
                primitive.iteration_bounds.to_array(),
                if primitive.orbit_trap { 1.0 } else { 0.0 },
            )
        } else {
            ([0.0; 2], 0.0)
        };

        Self {
            position: primitive.position.to_array(),
            scale: primitive.scale.to_array(),
            kind: primitive.kind.tag(),
            color: primitive.color.to_array(),
            phong: primitive.phong.to_array(),
            iteration_bounds,
            orbit_trap,
        }
    }
}

/// GPU representation of a point light (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightGpu {
    pub position: [f32; 3],
    pub intensity: f32,
}

impl GpuRecord for LightGpu {
    const LABEL: &'static str = "lights";
    const SLOT: &'static str = layout::LIGHT_BUFFER;
    const COUNT_SLOT: &'static str = layout::NUM_LIGHTS;
    const FIELDS: &'static [(&'static str, usize)] = &[("position", 3 * F32), ("intensity", F32)];
}

const _: () = assert!(std::mem::size_of::<LightGpu>() == declared_size(LightGpu::FIELDS));

impl From<&Light> for LightGpu {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.to_array(),
            intensity: light.intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use scene::{Phong, PrimitiveKind};

    fn read_f32s(bytes: &[u8], offset: usize, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let start = offset + i * F32;
                f32::from_le_bytes(bytes[start..start + F32].try_into().unwrap())
            })
            .collect()
    }

    fn read_i32(bytes: &[u8], offset: usize) -> i32 {
        i32::from_le_bytes(bytes[offset..offset + I32].try_into().unwrap())
    }

    #[test]
    fn declared_sizes_match_struct_sizes() {
        assert_eq!(PrimitiveGpu::size_of(), 68);
        assert_eq!(LightGpu::size_of(), 16);
        assert_eq!(PrimitiveGpu::size_of(), std::mem::size_of::<PrimitiveGpu>());
        assert_eq!(LightGpu::size_of(), std::mem::size_of::<LightGpu>());
    }

    #[test]
    fn field_offsets_follow_declaration_order() {
        assert_eq!(PrimitiveGpu::offset_of("position"), Some(0));
        assert_eq!(PrimitiveGpu::offset_of("kind"), Some(24));
        assert_eq!(PrimitiveGpu::offset_of("color"), Some(28));
        assert_eq!(PrimitiveGpu::offset_of("orbitTrap"), Some(64));
        assert_eq!(LightGpu::offset_of("intensity"), Some(12));
        assert_eq!(LightGpu::offset_of("missing"), None);
    }

    // Reads the bytes back the way the shader does, at the declared offsets.
    #[test]
    fn every_kind_decodes_from_declared_offsets() {
        for kind in PrimitiveKind::ALL {
            let primitive = Primitive::new(kind, Vec3::new(1.0, -2.0, 3.5))
                .with_scale(Vec3::new(0.5, 1.5, 2.0))
                .with_color(Vec4::new(0.1, 0.2, 0.3, 0.4))
                .with_phong(Phong::new(0.2, 0.6, 0.9))
                .with_iterations(2.0, 7.0)
                .with_orbit_trap(true);
            let record = PrimitiveGpu::from(&primitive);
            let bytes = bytemuck::bytes_of(&record);
            let at = |name| PrimitiveGpu::offset_of(name).unwrap();

            assert_eq!(read_f32s(bytes, at("position"), 3), vec![1.0, -2.0, 3.5]);
            assert_eq!(read_f32s(bytes, at("scale"), 3), vec![0.5, 1.5, 2.0]);
            assert_eq!(PrimitiveKind::from_tag(read_i32(bytes, at("kind"))), Some(kind));
            assert_eq!(read_f32s(bytes, at("color"), 4), vec![0.1, 0.2, 0.3, 0.4]);
            assert_eq!(read_f32s(bytes, at("phongParams"), 3), vec![0.2, 0.6, 0.9]);

            let bounds = read_f32s(bytes, at("iterationBounds"), 2);
            let trap = read_f32s(bytes, at("orbitTrap"), 1)[0];
            if kind.is_fractal() {
                assert_eq!(bounds, vec![2.0, 7.0], "{kind:?}");
                assert_eq!(trap, 1.0);
            } else {
                assert_eq!(bounds, vec![0.0, 0.0], "{kind:?}");
                assert_eq!(trap, 0.0);
            }
        }
    }

    #[test]
    fn light_decodes_from_declared_offsets() {
        let record = LightGpu::from(&Light::new(Vec3::new(0.0, 5.0, 0.0), 2.0));
        let bytes = bytemuck::bytes_of(&record);
        assert_eq!(read_f32s(bytes, 0, 4), vec![0.0, 5.0, 0.0, 2.0]);
    }
}
