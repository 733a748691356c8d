use crate::{BufferId, GpuError, UniformValue};

#[cfg(feature = "mock")]
pub mod mock;

pub trait RenderBackend {
    /// Compiles the shader program and any pipeline state it needs.
    ///
    /// Must be idempotent: calling it on an already prepared backend is a
    /// no-op that returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// [`GpuError::Shader`] if the program fails to compile.
    fn prepare(&mut self) -> Result<(), GpuError>;

    /// Allocates a GPU-visible buffer of `count * stride` bytes and copies
    /// `data` into it.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::StrideMismatch`] if `data.len()` is not exactly
    /// `count * stride`.
    fn create_buffer(
        &mut self,
        label: &str,
        data: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<BufferId, GpuError>;

    /// Attaches a live buffer to the named storage slot of the program.
    ///
    /// # Errors
    ///
    /// [`GpuError::UseAfterRelease`] or [`GpuError::UnknownBuffer`] for a dead
    /// buffer, [`GpuError::UnknownSlot`] for a name the program does not
    /// declare and [`GpuError::SlotStride`] when the element strides differ.
    fn bind_buffer(&mut self, slot: &str, buffer: BufferId) -> Result<(), GpuError>;

    /// Writes a value to the named uniform slot.
    ///
    /// # Errors
    ///
    /// [`GpuError::UnknownSlot`] or [`GpuError::UniformType`].
    fn set_uniform(&mut self, slot: &str, value: UniformValue) -> Result<(), GpuError>;

    /// Issues the full-screen draw with everything currently bound.
    ///
    /// # Errors
    ///
    /// Fails if a bound buffer was released, if no render target is set, or
    /// with [`GpuError::DrawFailed`] from the device.
    fn draw(&mut self) -> Result<(), GpuError>;

    /// Frees a buffer. Any later use of `buffer` fails with
    /// [`GpuError::UseAfterRelease`].
    ///
    /// # Errors
    ///
    /// [`GpuError::UseAfterRelease`] on a second release and
    /// [`GpuError::UnknownBuffer`] for ids this backend never issued.
    fn release_buffer(&mut self, buffer: BufferId) -> Result<(), GpuError>;

    /// Element stride in bytes that the program declares for a storage slot,
    /// or `None` if the backend cannot tell.
    fn expected_stride(&self, slot: &str) -> Option<usize>;
}
