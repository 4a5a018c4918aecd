//! The simulated machine: one memory arena and the operations over it

use crate::{
    config::Config,
    constants::memory::PAGE_COUNT,
    error::MemoryError,
    memory::{
        access::{self, AccessRecord},
        bitmap_frame_allocator,
        paging::{self, get_page_table, mapped_entries},
        PhysAddr, PhysFrame, PhysicalMemory, VirtAddr,
    },
    processes,
};

pub struct Machine {
    memory: PhysicalMemory,
    config: Config,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Machine {
    pub fn new(config: Config) -> Self {
        Self {
            memory: PhysicalMemory::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of simulated memory
    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    pub fn new_process(&mut self, pid: usize, page_count: usize) -> Result<PhysFrame, MemoryError> {
        processes::new_process(&mut self.memory, pid, page_count, self.config.oom_policy)
    }

    pub fn kill_process(&mut self, pid: usize) -> Result<usize, MemoryError> {
        processes::kill_process(&mut self.memory, pid)
    }

    pub fn store_value(
        &mut self,
        pid: usize,
        vaddr: usize,
        value: u8,
    ) -> Result<AccessRecord, MemoryError> {
        access::store_value(&mut self.memory, pid, VirtAddr::new(vaddr), value)
    }

    pub fn load_value(&self, pid: usize, vaddr: usize) -> Result<AccessRecord, MemoryError> {
        access::load_value(&self.memory, pid, VirtAddr::new(vaddr))
    }

    pub fn get_physical_addr(&self, pid: usize, vaddr: usize) -> Result<PhysAddr, MemoryError> {
        paging::get_physical_addr(&self.memory, pid, VirtAddr::new(vaddr))
    }

    pub fn get_page_table(&self, pid: usize) -> Result<Option<PhysFrame>, MemoryError> {
        get_page_table(&self.memory, pid)
    }

    /// Mapped entries of `pid`'s page table
    pub fn page_table(&self, pid: usize) -> Result<Vec<(usize, PhysFrame)>, MemoryError> {
        let table = self
            .get_page_table(pid)?
            .ok_or(MemoryError::UnboundProcess { pid })?;
        mapped_entries(&self.memory, table)
    }

    pub fn free_map(&self) -> [bool; PAGE_COUNT] {
        bitmap_frame_allocator::free_map(&self.memory)
    }

    pub fn free_frames(&self) -> usize {
        bitmap_frame_allocator::free_frames(&self.memory)
    }
}
