//! Per-frame scene snapshot
//!
//! Collects the provider's active primitives and lights and encodes them
//! into the record arrays the shader reads. A snapshot is rebuilt from
//! scratch every frame.

use scene::SceneProvider;

use crate::gpu_types::{LightGpu, PrimitiveGpu};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub primitives: Vec<PrimitiveGpu>,
    pub lights: Vec<LightGpu>,
}

impl Snapshot {
    /// Encodes everything the provider reports as active, in its order.
    #[must_use]
    pub fn build(provider: &dyn SceneProvider) -> Self {
        let primitives: Vec<PrimitiveGpu> =
            provider.active_primitives().iter().map(PrimitiveGpu::from).collect();
        let lights: Vec<LightGpu> = provider.active_lights().iter().map(LightGpu::from).collect();
        tracing::trace!(primitives = primitives.len(), lights = lights.len(), "scene snapshot");
        Self { primitives, lights }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.lights.is_empty()
    }

    /// Light that feeds the single-light uniforms.
    #[must_use]
    pub fn first_light(&self) -> Option<&LightGpu> {
        self.lights.first()
    }
}
