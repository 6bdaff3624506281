/// Identifies one outstanding tick request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The platform side of the frame loop.
///
/// A host delivers at most one tick per request, roughly in step with the
/// display, and stops delivering once a request is cancelled.
pub trait FrameHost {
    fn request_tick(&mut self) -> TickHandle;

    fn cancel_tick(&mut self, handle: TickHandle);

    /// `false` once the drawing surface is gone for good.
    fn surface_attached(&self) -> bool;
}
