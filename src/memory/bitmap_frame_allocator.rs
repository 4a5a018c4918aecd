use log::{debug, warn};

use crate::{
    constants::memory::{FRAME_FREE, FRAME_USED, PAGE_COUNT},
    memory::{
        addr::PhysFrame,
        frame_allocator::{FrameAllocator, FrameDeallocator},
        physical::PhysicalMemory,
    },
};

/// First-fit allocator over the one-byte-per-frame bitmap stored in page 0.
///
/// The allocator keeps no state of its own, so any number of them can be
/// created over the same memory one after another.
pub struct BitmapFrameAllocator<'m> {
    memory: &'m mut PhysicalMemory,
}

impl<'m> BitmapFrameAllocator<'m> {
    pub fn new(memory: &'m mut PhysicalMemory) -> Self {
        Self { memory }
    }

    /// Check if frame is used. Frames outside the bitmap count as used.
    pub fn is_frame_used(&self, frame: PhysFrame) -> bool {
        frame_used(self.memory, frame.index())
    }

    /// Number of frames an allocation could still return
    pub fn free_frames(&self) -> usize {
        free_frames(self.memory)
    }

    /// set a particular entry (1)
    fn mark_frame_used(&mut self, frame_index: usize) {
        self.memory.free_page_bitmap_mut()[frame_index] = FRAME_USED;
    }

    /// clear a particular entry (0)
    fn mark_frame_free(&mut self, frame_index: usize) {
        self.memory.free_page_bitmap_mut()[frame_index] = FRAME_FREE;
    }
}

impl FrameAllocator for BitmapFrameAllocator<'_> {
    /// Returns the lowest free frame above page 0 and marks it used.
    fn allocate_frame(&mut self) -> Option<PhysFrame> {
        let index = (1..PAGE_COUNT).find(|&index| !frame_used(self.memory, index))?;
        self.mark_frame_used(index);
        debug!("allocated frame {:#04x}", index);
        Some(PhysFrame::from_index(index as u8))
    }
}

impl FrameDeallocator for BitmapFrameAllocator<'_> {
    /// Marks the frame free whatever its prior state. Page 0 and indices past
    /// the bitmap are left alone.
    fn deallocate_frame(&mut self, frame: PhysFrame) {
        let index = frame.index();
        if index == 0 || index >= PAGE_COUNT {
            warn!("ignoring deallocation of frame {:#04x}", index);
            return;
        }
        self.mark_frame_free(index);
        debug!("freed frame {:#04x}", index);
    }
}

fn frame_used(memory: &PhysicalMemory, index: usize) -> bool {
    memory
        .free_page_bitmap()
        .get(index)
        .map_or(true, |&entry| entry != FRAME_FREE)
}

/// Snapshot of the bitmap, `true` for allocated frames
pub fn free_map(memory: &PhysicalMemory) -> [bool; PAGE_COUNT] {
    core::array::from_fn(|index| frame_used(memory, index))
}

pub fn free_frames(memory: &PhysicalMemory) -> usize {
    (1..PAGE_COUNT)
        .filter(|&index| !frame_used(memory, index))
        .count()
}
