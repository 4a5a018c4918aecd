pub mod access;
pub mod addr;
pub mod bitmap_frame_allocator;
pub mod frame_allocator;
pub mod paging;
pub mod physical;

pub use addr::{PhysAddr, PhysFrame, VirtAddr};
pub use physical::PhysicalMemory;
