use crate::memory::addr::PhysFrame;

/// Hands out physical frames. `None` means no free frame is left.
pub trait FrameAllocator {
    fn allocate_frame(&mut self) -> Option<PhysFrame>;
}

/// Returns frames to the free pool
pub trait FrameDeallocator {
    fn deallocate_frame(&mut self, frame: PhysFrame);
}
