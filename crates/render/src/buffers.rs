//! Frame-scoped GPU buffers
//!
//! [`FrameBuffers`] borrows the backend mutably for the length of one frame,
//! so no other code can touch the backend while the frame's buffers exist.
//! Every buffer it allocates is released by [`FrameBuffers::finish`] or, on
//! any early exit, by `Drop`.

use gpu::{BufferId, RenderBackend, UniformValue};
use tracing::{debug, error};

use crate::error::RenderError;
use crate::gpu_types::GpuRecord;

/// A buffer allocated inside a [`FrameBuffers`] scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHandle {
    id: BufferId,
    count: usize,
    stride: usize,
}

impl BufferHandle {
    #[must_use]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.count * self.stride
    }
}

pub struct FrameBuffers<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    live: Vec<BufferId>,
    bound: Vec<BufferId>,
    drawn: bool,
}

impl<'a, B: RenderBackend + ?Sized> FrameBuffers<'a, B> {
    #[must_use]
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend, live: Vec::new(), bound: Vec::new(), drawn: false }
    }

    /// Allocates a buffer holding `records`.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderError::LayoutMismatch`] if the program declares a
    /// different element stride for `T::SLOT`, in which case nothing is
    /// allocated, or with the backend's allocation error.
    pub fn upload<T: GpuRecord>(&mut self, records: &[T]) -> Result<BufferHandle, RenderError> {
        let stride = T::size_of();
        if let Some(device) = self.backend.expected_stride(T::SLOT) {
            if device != stride {
                return Err(RenderError::LayoutMismatch { slot: T::SLOT.to_owned(), host: stride, device });
            }
        }
        let bytes: &[u8] = bytemuck::cast_slice(records);
        let id = self.backend.create_buffer(T::LABEL, bytes, records.len(), stride)?;
        self.live.push(id);
        debug!(label = T::LABEL, ?id, count = records.len(), bytes = bytes.len(), "uploaded buffer");
        Ok(BufferHandle { id, count: records.len(), stride })
    }

    /// Attaches `handle` to a storage slot of the program.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderError::LayoutMismatch`] if the program declares a
    /// different element stride for `slot`.
    pub fn bind(&mut self, handle: &BufferHandle, slot: &str) -> Result<(), RenderError> {
        if let Some(device) = self.backend.expected_stride(slot) {
            if device != handle.stride {
                return Err(RenderError::LayoutMismatch {
                    slot: slot.to_owned(),
                    host: handle.stride,
                    device,
                });
            }
        }
        self.backend.bind_buffer(slot, handle.id)?;
        self.bound.push(handle.id);
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates unknown slots and type mismatches from the backend.
    pub fn set_uniform(&mut self, slot: &str, value: UniformValue) -> Result<(), RenderError> {
        self.backend.set_uniform(slot, value)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates the backend's draw failure.
    pub fn draw(&mut self) -> Result<(), RenderError> {
        self.backend.draw()?;
        self.drawn = true;
        debug!(buffers = self.bound.len(), "draw issued");
        Ok(())
    }

    /// Releases one buffer ahead of the end of the frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ReleaseBeforeDraw`] for a bound buffer while the
    /// draw is still pending.
    pub fn release(&mut self, handle: BufferHandle) -> Result<(), RenderError> {
        if !self.drawn && self.bound.contains(&handle.id) {
            return Err(RenderError::ReleaseBeforeDraw(handle.id));
        }
        self.backend.release_buffer(handle.id)?;
        self.live.retain(|&id| id != handle.id);
        Ok(())
    }

    /// Whether the frame's draw has been issued.
    #[must_use]
    pub fn drawn(&self) -> bool {
        self.drawn
    }

    /// Number of buffers not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Ends the frame, releasing every buffer still live.
    ///
    /// # Errors
    ///
    /// Returns the first release error. The remaining buffers are still
    /// released.
    pub fn finish(mut self) -> Result<(), RenderError> {
        self.release_all()
    }

    fn release_all(&mut self) -> Result<(), RenderError> {
        let mut first = None;
        for id in std::mem::take(&mut self.live) {
            if let Err(err) = self.backend.release_buffer(id) {
                error!(?id, %err, "failed to release buffer");
                first.get_or_insert(err);
            }
        }
        self.bound.clear();
        match first {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl<B: RenderBackend + ?Sized> Drop for FrameBuffers<'_, B> {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            debug!(buffers = self.live.len(), "releasing buffers on early exit");
            // failures are already logged per buffer
            let _ = self.release_all();
        }
    }
}
