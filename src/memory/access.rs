//! Byte loads and stores through a process's address mapping

use core::fmt;

use log::trace;

use crate::{
    error::MemoryError,
    memory::{
        addr::{PhysAddr, VirtAddr},
        paging::get_physical_addr,
        physical::PhysicalMemory,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Store,
    Load,
}

/// Trace of one store or load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    pub kind: AccessKind,
    pub pid: usize,
    pub vaddr: VirtAddr,
    pub paddr: PhysAddr,
    pub value: u8,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            AccessKind::Store => "Store",
            AccessKind::Load => "Load",
        };
        write!(
            f,
            "{} proc {}: {} => {}, value={}",
            verb, self.pid, self.vaddr, self.paddr, self.value
        )
    }
}

pub fn store_value(
    memory: &mut PhysicalMemory,
    pid: usize,
    vaddr: VirtAddr,
    value: u8,
) -> Result<AccessRecord, MemoryError> {
    let paddr = get_physical_addr(memory, pid, vaddr)?;
    memory.write(paddr, value)?;

    let record = AccessRecord {
        kind: AccessKind::Store,
        pid,
        vaddr,
        paddr,
        value,
    };
    trace!("{}", record);
    Ok(record)
}

pub fn load_value(
    memory: &PhysicalMemory,
    pid: usize,
    vaddr: VirtAddr,
) -> Result<AccessRecord, MemoryError> {
    let paddr = get_physical_addr(memory, pid, vaddr)?;
    let value = memory.read(paddr)?;

    let record = AccessRecord {
        kind: AccessKind::Load,
        pid,
        vaddr,
        paddr,
        value,
    };
    trace!("{}", record);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        addr::PhysFrame,
        paging::{bind_page_table, write_entry, PageTableEntry},
    };

    fn memory_with_process() -> PhysicalMemory {
        let mut memory = PhysicalMemory::new();
        let table = PhysFrame::from_index(1);
        bind_page_table(&mut memory, 1, table).unwrap();
        write_entry(
            &mut memory,
            table,
            0,
            PageTableEntry::Mapped(PhysFrame::from_index(2)),
        )
        .unwrap();
        memory
    }

    #[test]
    fn test_store_then_load() {
        let mut memory = memory_with_process();
        let stored = store_value(&mut memory, 1, VirtAddr::new(10), 42).unwrap();
        let loaded = load_value(&memory, 1, VirtAddr::new(10)).unwrap();

        assert_eq!(stored.paddr, PhysAddr::new(0x20a));
        assert_eq!(loaded.paddr, stored.paddr);
        assert_eq!(loaded.value, 42);
        assert_eq!(stored.to_string(), "Store proc 1: 10 => 522, value=42");
        assert_eq!(loaded.to_string(), "Load proc 1: 10 => 522, value=42");
    }

    #[test]
    fn test_unmapped_access_leaves_page_zero_alone() {
        let mut memory = memory_with_process();
        assert_eq!(
            store_value(&mut memory, 1, VirtAddr::new(0x100), 7),
            Err(MemoryError::UnmappedPage { pid: 1, vpage: 1 })
        );
        assert_eq!(
            store_value(&mut memory, 4, VirtAddr::new(0), 7),
            Err(MemoryError::UnboundProcess { pid: 4 })
        );
        assert!(memory.free_page_bitmap()[1..].iter().all(|&b| b == 0));
    }
}
