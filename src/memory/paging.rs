//! Process table and two-level address translation
//!
//! The process table in page 0 maps a process id to the frame holding that
//! process's page table. A page table is one frame of one-byte entries, entry
//! `v` naming the frame backing virtual page `v`. A zero byte means unmapped in
//! both tables; page 0 is never handed out, so it cannot be a real target.

use crate::{
    constants::{memory::PAGE_TABLE_ENTRIES, processes::MAX_PROC},
    error::MemoryError,
    memory::{
        addr::{get_address, PhysAddr, PhysFrame, VirtAddr},
        physical::PhysicalMemory,
    },
};

const UNMAPPED: u8 = 0;

/// Decoded page-table or process-table byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTableEntry {
    Unmapped,
    Mapped(PhysFrame),
}

impl PageTableEntry {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            UNMAPPED => PageTableEntry::Unmapped,
            index => PageTableEntry::Mapped(PhysFrame::from_index(index)),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            PageTableEntry::Unmapped => UNMAPPED,
            PageTableEntry::Mapped(frame) => frame.as_u8(),
        }
    }

    pub fn frame(self) -> Option<PhysFrame> {
        match self {
            PageTableEntry::Unmapped => None,
            PageTableEntry::Mapped(frame) => Some(frame),
        }
    }
}

fn validate_pid(pid: usize) -> Result<(), MemoryError> {
    if pid >= MAX_PROC {
        return Err(MemoryError::InvalidProcessId { pid });
    }
    Ok(())
}

/// Frame holding `pid`'s page table, if the process is bound
pub fn get_page_table(memory: &PhysicalMemory, pid: usize) -> Result<Option<PhysFrame>, MemoryError> {
    validate_pid(pid)?;
    Ok(PageTableEntry::from_raw(memory.process_table()[pid]).frame())
}

pub fn bind_page_table(
    memory: &mut PhysicalMemory,
    pid: usize,
    frame: PhysFrame,
) -> Result<(), MemoryError> {
    validate_pid(pid)?;
    memory.process_table_mut()[pid] = PageTableEntry::Mapped(frame).to_raw();
    Ok(())
}

/// Clears `pid`'s process table entry, returning what it held.
pub fn unbind_page_table(
    memory: &mut PhysicalMemory,
    pid: usize,
) -> Result<Option<PhysFrame>, MemoryError> {
    validate_pid(pid)?;
    let previous = PageTableEntry::from_raw(memory.process_table()[pid]);
    memory.process_table_mut()[pid] = PageTableEntry::Unmapped.to_raw();
    Ok(previous.frame())
}

fn validate_vpage(vpage: usize) -> Result<(), MemoryError> {
    if vpage >= PAGE_TABLE_ENTRIES {
        return Err(MemoryError::InvalidAddress {
            vaddr: get_address(vpage, 0),
        });
    }
    Ok(())
}

pub fn read_entry(
    memory: &PhysicalMemory,
    table: PhysFrame,
    vpage: usize,
) -> Result<PageTableEntry, MemoryError> {
    validate_vpage(vpage)?;
    Ok(PageTableEntry::from_raw(memory.frame(table)?[vpage]))
}

pub fn write_entry(
    memory: &mut PhysicalMemory,
    table: PhysFrame,
    vpage: usize,
    entry: PageTableEntry,
) -> Result<(), MemoryError> {
    validate_vpage(vpage)?;
    memory.frame_mut(table)?[vpage] = entry.to_raw();
    Ok(())
}

/// Every mapped (virtual page, frame) pair in increasing virtual page order
pub fn mapped_entries(
    memory: &PhysicalMemory,
    table: PhysFrame,
) -> Result<Vec<(usize, PhysFrame)>, MemoryError> {
    Ok(memory
        .frame(table)?
        .iter()
        .enumerate()
        .filter_map(|(vpage, &raw)| PageTableEntry::from_raw(raw).frame().map(|f| (vpage, f)))
        .collect())
}

/// Walk process table -> page table -> frame and compose the physical address.
pub fn get_physical_addr(
    memory: &PhysicalMemory,
    pid: usize,
    vaddr: VirtAddr,
) -> Result<PhysAddr, MemoryError> {
    let table = get_page_table(memory, pid)?.ok_or(MemoryError::UnboundProcess { pid })?;

    let vpage = vaddr.page_index();
    if vpage >= PAGE_TABLE_ENTRIES {
        return Err(MemoryError::InvalidAddress {
            vaddr: vaddr.as_usize(),
        });
    }

    match read_entry(memory, table, vpage)? {
        PageTableEntry::Mapped(frame) => Ok(PhysAddr::from_parts(frame, vaddr.page_offset())),
        PageTableEntry::Unmapped => Err(MemoryError::UnmappedPage { pid, vpage }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_process(pid: usize, table: u8, mappings: &[(usize, u8)]) -> PhysicalMemory {
        let mut memory = PhysicalMemory::new();
        let table = PhysFrame::from_index(table);
        bind_page_table(&mut memory, pid, table).unwrap();
        for &(vpage, frame) in mappings {
            write_entry(
                &mut memory,
                table,
                vpage,
                PageTableEntry::Mapped(PhysFrame::from_index(frame)),
            )
            .unwrap();
        }
        memory
    }

    #[test]
    fn test_entry_encoding() {
        assert_eq!(PageTableEntry::from_raw(0), PageTableEntry::Unmapped);
        assert_eq!(
            PageTableEntry::from_raw(5),
            PageTableEntry::Mapped(PhysFrame::from_index(5))
        );
        assert_eq!(PageTableEntry::Unmapped.to_raw(), 0);
        assert_eq!(PageTableEntry::Mapped(PhysFrame::from_index(9)).to_raw(), 9);
    }

    #[test]
    fn test_process_table_binding() {
        let mut memory = PhysicalMemory::new();
        assert_eq!(get_page_table(&memory, 3), Ok(None));

        bind_page_table(&mut memory, 3, PhysFrame::from_index(4)).unwrap();
        assert_eq!(get_page_table(&memory, 3), Ok(Some(PhysFrame::from_index(4))));
        assert_eq!(memory.process_table()[3], 4);

        assert_eq!(
            unbind_page_table(&mut memory, 3),
            Ok(Some(PhysFrame::from_index(4)))
        );
        assert_eq!(get_page_table(&memory, 3), Ok(None));
        assert_eq!(unbind_page_table(&mut memory, 3), Ok(None));
    }

    #[test]
    fn test_invalid_pid() {
        let memory = PhysicalMemory::new();
        assert_eq!(
            get_page_table(&memory, MAX_PROC),
            Err(MemoryError::InvalidProcessId { pid: MAX_PROC })
        );
    }

    #[test]
    fn test_translate() {
        let memory = with_process(1, 1, &[(0, 2), (1, 3)]);
        assert_eq!(
            get_physical_addr(&memory, 1, VirtAddr::new(0)),
            Ok(PhysAddr::new(0x200))
        );
        assert_eq!(
            get_physical_addr(&memory, 1, VirtAddr::new(0x1ff)),
            Ok(PhysAddr::new(0x3ff))
        );
    }

    #[test]
    fn test_translate_unmapped_page() {
        let memory = with_process(1, 1, &[(0, 2)]);
        assert_eq!(
            get_physical_addr(&memory, 1, VirtAddr::new(0x200)),
            Err(MemoryError::UnmappedPage { pid: 1, vpage: 2 })
        );
    }

    #[test]
    fn test_translate_unbound_process() {
        let memory = PhysicalMemory::new();
        assert_eq!(
            get_physical_addr(&memory, 7, VirtAddr::new(0)),
            Err(MemoryError::UnboundProcess { pid: 7 })
        );
    }

    #[test]
    fn test_translate_rejects_large_address() {
        let memory = with_process(1, 1, &[(0, 2)]);
        assert_eq!(
            get_physical_addr(&memory, 1, VirtAddr::new(0x1_0000)),
            Err(MemoryError::InvalidAddress { vaddr: 0x1_0000 })
        );
        // highest valid address still goes through the table
        assert_eq!(
            get_physical_addr(&memory, 1, VirtAddr::new(0xffff)),
            Err(MemoryError::UnmappedPage { pid: 1, vpage: 0xff })
        );
    }

    #[test]
    fn test_mapped_entries() {
        let memory = with_process(2, 5, &[(3, 7), (0, 6)]);
        assert_eq!(
            mapped_entries(&memory, PhysFrame::from_index(5)),
            Ok(vec![
                (0, PhysFrame::from_index(6)),
                (3, PhysFrame::from_index(7))
            ])
        );
    }
}
