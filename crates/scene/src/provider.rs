//! Scene discovery
//!
//! The renderer never walks a scene graph itself. It asks a [`SceneProvider`]
//! for the primitives and lights that are active right now, every frame.

use crate::types::{Light, Primitive};

pub trait SceneProvider {
    /// Active primitives in a stable enumeration order.
    fn active_primitives(&self) -> Vec<Primitive>;
    /// Active lights in a stable enumeration order.
    fn active_lights(&self) -> Vec<Light>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(usize);

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    active: bool,
}

/// In-memory scene. Enumerates active entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Entry<Primitive>>,
    lights: Vec<Entry<Light>>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        self.primitives.push(Entry { item: primitive, active: true });
        PrimitiveId(self.primitives.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.push(Entry { item: light, active: true });
        LightId(self.lights.len() - 1)
    }

    pub fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(id.0).map(|e| &mut e.item)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0).map(|e| &mut e.item)
    }

    /// Returns `false` if `id` does not exist.
    pub fn set_primitive_active(&mut self, id: PrimitiveId, active: bool) -> bool {
        match self.primitives.get_mut(id.0) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Returns `false` if `id` does not exist.
    pub fn set_light_active(&mut self, id: LightId, active: bool) -> bool {
        match self.lights.get_mut(id.0) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Total number of primitives, active or not.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
        self.lights.clear();
    }
}

impl SceneProvider for Scene {
    fn active_primitives(&self) -> Vec<Primitive> {
        self.primitives.iter().filter(|e| e.active).map(|e| e.item).collect()
    }

    fn active_lights(&self) -> Vec<Light> {
        self.lights.iter().filter(|e| e.active).map(|e| e.item).collect()
    }
}
