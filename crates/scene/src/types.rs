use glam::{Vec2, Vec3, Vec4};

/// Surface kinds understood by the ray-marching program.
///
/// The discriminant is the tag written into the primitive buffer, so new
/// kinds go at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PrimitiveKind {
    Sphere = 0,
    Cube = 1,
    Menger = 2,
    Sierpinski = 3,
    Mandelbulb = 4,
    Julia = 5,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::Sphere,
        PrimitiveKind::Cube,
        PrimitiveKind::Menger,
        PrimitiveKind::Sierpinski,
        PrimitiveKind::Mandelbulb,
        PrimitiveKind::Julia,
    ];

    #[must_use]
    pub const fn tag(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_tag(tag: i32) -> Option<Self> {
        let index = usize::try_from(tag).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Fractal kinds use the iteration bounds and orbit trap flag.
    #[must_use]
    pub const fn is_fractal(self) -> bool {
        !matches!(self, PrimitiveKind::Sphere | PrimitiveKind::Cube)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Sphere => "sphere",
            PrimitiveKind::Cube => "cube",
            PrimitiveKind::Menger => "menger",
            PrimitiveKind::Sierpinski => "sierpinski",
            PrimitiveKind::Mandelbulb => "mandelbulb",
            PrimitiveKind::Julia => "julia",
        }
    }

    /// Iteration bounds a fractal of this kind starts with.
    #[must_use]
    pub const fn default_iterations(self) -> [f32; 2] {
        match self {
            PrimitiveKind::Sphere | PrimitiveKind::Cube => [0.0, 0.0],
            PrimitiveKind::Menger => [1.0, 5.0],
            PrimitiveKind::Sierpinski => [1.0, 10.0],
            PrimitiveKind::Mandelbulb => [1.0, 12.0],
            PrimitiveKind::Julia => [1.0, 11.0],
        }
    }
}

/// Local shading coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Phong {
    #[must_use]
    pub const fn new(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self { ambient, diffuse, specular }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.ambient, self.diffuse, self.specular]
    }
}

impl Default for Phong {
    fn default() -> Self {
        Self::new(0.1, 0.8, 0.3)
    }
}

/// One implicit surface instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub position: Vec3,
    /// Non-uniform scale. Rotation is not modelled.
    pub scale: Vec3,
    /// RGBA
    pub color: Vec4,
    pub phong: Phong,
    /// Min/max iteration count, only read for fractal kinds.
    pub iteration_bounds: Vec2,
    pub orbit_trap: bool,
}

impl Primitive {
    #[must_use]
    pub fn new(kind: PrimitiveKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            scale: Vec3::ONE,
            color: Vec4::ONE,
            phong: Phong::default(),
            iteration_bounds: Vec2::from_array(kind.default_iterations()),
            orbit_trap: false,
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_phong(mut self, phong: Phong) -> Self {
        self.phong = phong;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, min: f32, max: f32) -> Self {
        self.iteration_bounds = Vec2::new(min, max);
        self
    }

    #[must_use]
    pub fn with_orbit_trap(mut self, enabled: bool) -> Self {
        self.orbit_trap = enabled;
        self
    }
}

/// Point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f32,
}

impl Light {
    #[must_use]
    pub const fn new(position: Vec3, intensity: f32) -> Self {
        Self { position, intensity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_declaration_order() {
        for (index, kind) in PrimitiveKind::ALL.iter().enumerate() {
            assert_eq!(kind.tag(), i32::try_from(index).unwrap());
            assert_eq!(PrimitiveKind::from_tag(kind.tag()), Some(*kind));
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(PrimitiveKind::from_tag(-1), None);
        assert_eq!(PrimitiveKind::from_tag(6), None);
    }

    #[test]
    fn simple_kinds_start_without_iterations() {
        let sphere = Primitive::new(PrimitiveKind::Sphere, Vec3::ZERO);
        assert_eq!(sphere.iteration_bounds, Vec2::ZERO);
        let bulb = Primitive::new(PrimitiveKind::Mandelbulb, Vec3::ZERO);
        assert!(bulb.iteration_bounds.y > bulb.iteration_bounds.x);
    }
}
