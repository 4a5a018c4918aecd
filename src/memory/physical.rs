//! Simulated physical memory

use crate::{
    constants::memory::{
        BITMAP_OFFSET, FRAME_USED, MEM_SIZE, PAGE_COUNT, PAGE_SIZE, PROCESS_TABLE_OFFSET,
    },
    error::MemoryError,
    memory::addr::{PhysAddr, PhysFrame},
};

/// Fixed-size byte store standing in for RAM
pub struct PhysicalMemory {
    bytes: Box<[u8]>,
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalMemory {
    /// Creates zeroed memory with page 0 marked allocated in the free page bitmap.
    pub fn new() -> Self {
        let mut bytes = vec![0; MEM_SIZE].into_boxed_slice();
        bytes[BITMAP_OFFSET] = FRAME_USED;
        Self { bytes }
    }

    /// One byte per frame, stored at the start of page 0
    pub fn free_page_bitmap(&self) -> &[u8] {
        &self.bytes[BITMAP_OFFSET..BITMAP_OFFSET + PAGE_COUNT]
    }

    pub fn free_page_bitmap_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[BITMAP_OFFSET..BITMAP_OFFSET + PAGE_COUNT]
    }

    /// One byte per process id, filling page 0 after the bitmap
    pub fn process_table(&self) -> &[u8] {
        &self.bytes[PROCESS_TABLE_OFFSET..PAGE_SIZE]
    }

    pub fn process_table_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[PROCESS_TABLE_OFFSET..PAGE_SIZE]
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Validates address is within bounds
    fn validate(&self, addr: PhysAddr) -> Result<usize, MemoryError> {
        let addr = addr.as_usize();
        if addr >= self.bytes.len() {
            return Err(MemoryError::AddressOutOfRange { addr });
        }
        Ok(addr)
    }

    pub fn read(&self, addr: PhysAddr) -> Result<u8, MemoryError> {
        let addr = self.validate(addr)?;
        Ok(self.bytes[addr])
    }

    pub fn write(&mut self, addr: PhysAddr, value: u8) -> Result<(), MemoryError> {
        let addr = self.validate(addr)?;
        self.bytes[addr] = value;
        Ok(())
    }

    /// Borrow the bytes of one page
    pub fn frame(&self, frame: PhysFrame) -> Result<&[u8], MemoryError> {
        let start = self.validate(frame.start_address())?;
        Ok(&self.bytes[start..start + PAGE_SIZE])
    }

    pub fn frame_mut(&mut self, frame: PhysFrame) -> Result<&mut [u8], MemoryError> {
        let start = self.validate(frame.start_address())?;
        Ok(&mut self.bytes[start..start + PAGE_SIZE])
    }
}
