//! Address and page-frame newtypes

use core::fmt;

use crate::constants::memory::{PAGE_SHIFT, PAGE_SIZE};

/// Compose an address from a page index and an offset within that page.
pub const fn get_address(page: usize, offset: usize) -> usize {
    (page << PAGE_SHIFT) | offset
}

/// A physical page, identified by its index in simulated memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysFrame(u8);

impl PhysFrame {
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn containing_address(addr: PhysAddr) -> Self {
        Self((addr.as_usize() >> PAGE_SHIFT) as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Value stored in a page-table or process-table byte
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub const fn start_address(self) -> PhysAddr {
        PhysAddr(get_address(self.0 as usize, 0))
    }
}

impl fmt::Display for PhysFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Absolute address into simulated memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(usize);

impl PhysAddr {
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    pub fn from_parts(frame: PhysFrame, offset: usize) -> Self {
        Self(get_address(frame.index(), offset))
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-relative address, split into virtual page index and offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(usize);

impl VirtAddr {
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }

    pub const fn page_index(self) -> usize {
        self.0 >> PAGE_SHIFT
    }

    pub const fn page_offset(self) -> usize {
        self.0 & (PAGE_SIZE - 1)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
