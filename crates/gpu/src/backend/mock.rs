use std::collections::{BTreeMap, HashMap, HashSet};

use crate::backend::RenderBackend;
use crate::layout::{self, FrameUniforms};
use crate::reflect::ShaderLayout;
use crate::{BufferId, GpuError, UniformValue};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare,
    Upload { buffer: BufferId, label: String, len: usize },
    Bind { slot: String, buffer: BufferId },
    Uniform { slot: String, value: UniformValue },
    Draw,
    Release { buffer: BufferId },
}

#[derive(Debug, Clone)]
struct MockBuffer {
    label: String,
    data: Vec<u8>,
    stride: usize,
}

/// Recording backend for tests.
///
/// Buffers keep their bytes until released; released ids stay poisoned so any
/// later bind, draw or release of them reports [`GpuError::UseAfterRelease`].
#[derive(Debug, Default)]
pub struct MockGpu {
    calls: Vec<Call>,
    buffers: BTreeMap<BufferId, MockBuffer>,
    released: HashSet<BufferId>,
    bound: HashMap<String, BufferId>,
    uniforms: FrameUniforms,
    strides: HashMap<String, usize>,
    next_id: u64,
    prepared: bool,
    /// When set, the next `draw` fails once with [`GpuError::DrawFailed`].
    pub fail_next_draw: bool,
}

impl MockGpu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the expected storage strides from a WGSL program.
    ///
    /// # Errors
    ///
    /// Propagates shader parse or validation errors.
    pub fn from_shader(source: &str) -> Result<Self, GpuError> {
        let reflected = ShaderLayout::from_wgsl(source)?;
        let mut gpu = Self::new();
        for slot in layout::STORAGE_SLOTS {
            if let Some(stride) = reflected.stride(slot) {
                gpu.strides.insert(slot.to_owned(), stride);
            }
        }
        Ok(gpu)
    }

    /// Declares the stride the fake program expects for `slot`.
    #[must_use]
    pub fn with_stride(mut self, slot: &str, stride: usize) -> Self {
        self.strides.insert(slot.to_owned(), stride);
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    #[must_use]
    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Bytes of a live buffer.
    #[must_use]
    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    #[must_use]
    pub fn buffer_label(&self, buffer: BufferId) -> Option<&str> {
        self.buffers.get(&buffer).map(|b| b.label.as_str())
    }

    #[must_use]
    pub fn bound(&self, slot: &str) -> Option<BufferId> {
        self.bound.get(slot).copied()
    }

    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn is_released(&self, buffer: BufferId) -> bool {
        self.released.contains(&buffer)
    }

    #[must_use]
    pub fn prepared(&self) -> bool {
        self.prepared
    }

    fn check_live(&self, buffer: BufferId) -> Result<(), GpuError> {
        if self.released.contains(&buffer) {
            Err(GpuError::UseAfterRelease(buffer))
        } else if !self.buffers.contains_key(&buffer) {
            Err(GpuError::UnknownBuffer(buffer))
        } else {
            Ok(())
        }
    }
}

impl RenderBackend for MockGpu {
    fn prepare(&mut self) -> Result<(), GpuError> {
        if !self.prepared {
            self.prepared = true;
            self.calls.push(Call::Prepare);
        }
        Ok(())
    }

    fn create_buffer(
        &mut self,
        label: &str,
        data: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<BufferId, GpuError> {
        if data.len() != count * stride {
            return Err(GpuError::StrideMismatch { len: data.len(), count, stride });
        }
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            MockBuffer { label: label.to_owned(), data: data.to_vec(), stride },
        );
        self.calls.push(Call::Upload { buffer: id, label: label.to_owned(), len: data.len() });
        Ok(id)
    }

    fn bind_buffer(&mut self, slot: &str, buffer: BufferId) -> Result<(), GpuError> {
        self.check_live(buffer)?;
        if layout::storage_binding(slot).is_none() {
            return Err(GpuError::UnknownSlot(slot.to_owned()));
        }
        if let Some(&device) = self.strides.get(slot) {
            let host = self.buffers[&buffer].stride;
            if host != device {
                return Err(GpuError::SlotStride { slot: slot.to_owned(), host, device });
            }
        }
        self.bound.insert(slot.to_owned(), buffer);
        self.calls.push(Call::Bind { slot: slot.to_owned(), buffer });
        Ok(())
    }

    fn set_uniform(&mut self, slot: &str, value: UniformValue) -> Result<(), GpuError> {
        self.uniforms.set(slot, value)?;
        self.calls.push(Call::Uniform { slot: slot.to_owned(), value });
        Ok(())
    }

    fn draw(&mut self) -> Result<(), GpuError> {
        for &buffer in self.bound.values() {
            self.check_live(buffer)?;
        }
        if self.fail_next_draw {
            self.fail_next_draw = false;
            return Err(GpuError::DrawFailed("injected failure".into()));
        }
        self.calls.push(Call::Draw);
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferId) -> Result<(), GpuError> {
        self.check_live(buffer)?;
        self.buffers.remove(&buffer);
        self.released.insert(buffer);
        self.calls.push(Call::Release { buffer });
        Ok(())
    }

    fn expected_stride(&self, slot: &str) -> Option<usize> {
        self.strides.get(slot).copied()
    }
}
