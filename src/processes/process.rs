use arrayvec::ArrayVec;
use log::{debug, warn};

use crate::{
    constants::memory::PAGE_COUNT,
    error::{MemoryError, OomStage},
    memory::{
        bitmap_frame_allocator::BitmapFrameAllocator,
        frame_allocator::{FrameAllocator, FrameDeallocator},
        paging::{
            bind_page_table, get_page_table, mapped_entries, unbind_page_table, write_entry,
            PageTableEntry,
        },
        PhysFrame, PhysicalMemory,
    },
};

/// What `new_process` does with the pages it already took when it runs out
/// of memory partway through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OomPolicy {
    /// Keep the page table binding and every data page mapped so far.
    #[default]
    Retain,
    /// Free everything this call allocated and leave the process unbound.
    Rollback,
}

/// Allocates a page table for `pid` plus `page_count` data pages mapped at
/// virtual pages `0..page_count`. Returns the page table frame.
pub fn new_process(
    memory: &mut PhysicalMemory,
    pid: usize,
    page_count: usize,
    policy: OomPolicy,
) -> Result<PhysFrame, MemoryError> {
    if get_page_table(memory, pid)?.is_some() {
        return Err(MemoryError::ProcessExists { pid });
    }

    let Some(page_table) = BitmapFrameAllocator::new(memory).allocate_frame() else {
        warn!("process {}: no frame left for page table", pid);
        return Err(MemoryError::OutOfMemory {
            pid,
            stage: OomStage::PageTable,
        });
    };

    // Need to zero out new page table, the frame may hold stale bytes
    memory.frame_mut(page_table)?.fill(0);
    bind_page_table(memory, pid, page_table)?;
    debug!("process {}: page table at frame {}", pid, page_table);

    let mut allocated: ArrayVec<PhysFrame, PAGE_COUNT> = ArrayVec::new();
    allocated.push(page_table);

    for vpage in 0..page_count {
        let Some(frame) = BitmapFrameAllocator::new(memory).allocate_frame() else {
            warn!(
                "process {}: out of frames after {} of {} data pages",
                pid, vpage, page_count
            );
            if policy == OomPolicy::Rollback {
                rollback(memory, pid, &allocated)?;
            }
            return Err(MemoryError::OutOfMemory {
                pid,
                stage: OomStage::DataPage,
            });
        };
        allocated.push(frame);
        write_entry(memory, page_table, vpage, PageTableEntry::Mapped(frame))?;
    }

    debug!("process {}: mapped {} data pages", pid, page_count);
    Ok(page_table)
}

fn rollback(
    memory: &mut PhysicalMemory,
    pid: usize,
    allocated: &[PhysFrame],
) -> Result<(), MemoryError> {
    unbind_page_table(memory, pid)?;
    let mut allocator = BitmapFrameAllocator::new(memory);
    for &frame in allocated {
        allocator.deallocate_frame(frame);
    }
    debug!("process {}: rolled back {} frames", pid, allocated.len());
    Ok(())
}

/// Unbinds `pid` and frees its data pages and page table. Returns the number
/// of frames freed; killing an unbound process frees nothing.
pub fn kill_process(memory: &mut PhysicalMemory, pid: usize) -> Result<usize, MemoryError> {
    let Some(page_table) = unbind_page_table(memory, pid)? else {
        debug!("process {}: not bound, nothing to free", pid);
        return Ok(0);
    };

    let data_pages = mapped_entries(memory, page_table)?;
    let mut allocator = BitmapFrameAllocator::new(memory);
    for &(_, frame) in &data_pages {
        allocator.deallocate_frame(frame);
    }
    allocator.deallocate_frame(page_table);

    debug!(
        "process {}: freed {} data pages and page table {}",
        pid,
        data_pages.len(),
        page_table
    );
    Ok(data_pages.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        bitmap_frame_allocator::{free_frames, free_map},
        paging::read_entry,
    };

    #[test]
    fn test_new_process_layout() {
        let mut memory = PhysicalMemory::new();
        let table = new_process(&mut memory, 1, 2, OomPolicy::Retain).unwrap();

        assert_eq!(table, PhysFrame::from_index(1));
        assert_eq!(get_page_table(&memory, 1), Ok(Some(table)));
        assert_eq!(
            mapped_entries(&memory, table),
            Ok(vec![
                (0, PhysFrame::from_index(2)),
                (1, PhysFrame::from_index(3))
            ])
        );
        assert_eq!(free_frames(&memory), PAGE_COUNT - 1 - 3);
    }

    #[test]
    fn test_new_process_rejects_bound_pid() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 1, OomPolicy::Retain).unwrap();
        let before = free_map(&memory);

        assert_eq!(
            new_process(&mut memory, 1, 4, OomPolicy::Retain),
            Err(MemoryError::ProcessExists { pid: 1 })
        );
        assert_eq!(free_map(&memory), before);
    }

    #[test]
    fn test_page_table_oom() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, PAGE_COUNT - 2, OomPolicy::Retain).unwrap();
        assert_eq!(free_frames(&memory), 0);

        assert_eq!(
            new_process(&mut memory, 2, 1, OomPolicy::Retain),
            Err(MemoryError::OutOfMemory {
                pid: 2,
                stage: OomStage::PageTable
            })
        );
        assert_eq!(get_page_table(&memory, 2), Ok(None));
    }

    #[test]
    fn test_data_page_oom_retains_partial_process() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 60, OomPolicy::Retain).unwrap();

        assert_eq!(
            new_process(&mut memory, 2, 5, OomPolicy::Retain),
            Err(MemoryError::OutOfMemory {
                pid: 2,
                stage: OomStage::DataPage
            })
        );
        let table = get_page_table(&memory, 2).unwrap().unwrap();
        assert_eq!(mapped_entries(&memory, table).unwrap().len(), 1);
        assert_eq!(free_frames(&memory), 0);

        // the partial process can still be reclaimed
        assert_eq!(kill_process(&mut memory, 2), Ok(2));
        assert_eq!(free_frames(&memory), 2);
    }

    #[test]
    fn test_data_page_oom_rollback() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 60, OomPolicy::Retain).unwrap();
        let before = free_map(&memory);

        assert!(new_process(&mut memory, 2, 5, OomPolicy::Rollback).is_err());
        assert_eq!(get_page_table(&memory, 2), Ok(None));
        assert_eq!(free_map(&memory), before);
    }

    #[test]
    fn test_kill_process_frees_everything() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 2, OomPolicy::Retain).unwrap();
        new_process(&mut memory, 2, 3, OomPolicy::Retain).unwrap();

        assert_eq!(kill_process(&mut memory, 1), Ok(3));
        assert_eq!(get_page_table(&memory, 1), Ok(None));

        let map = free_map(&memory);
        assert!(map[0]);
        assert!(!map[1] && !map[2] && !map[3]);
        assert!(map[4..8].iter().all(|&used| used));
        assert!(map[8..].iter().all(|&used| !used));
    }

    #[test]
    fn test_kill_unbound_process_is_noop() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 2, OomPolicy::Retain).unwrap();
        let before = free_map(&memory);

        assert_eq!(kill_process(&mut memory, 9), Ok(0));
        assert_eq!(kill_process(&mut memory, 9), Ok(0));
        assert_eq!(free_map(&memory), before);
    }

    #[test]
    fn test_reused_page_table_starts_empty() {
        let mut memory = PhysicalMemory::new();
        new_process(&mut memory, 1, 1, OomPolicy::Retain).unwrap();
        // scribble over the data page, then free it for reuse as a page table
        memory
            .frame_mut(PhysFrame::from_index(2))
            .unwrap()
            .fill(0x30);
        kill_process(&mut memory, 1).unwrap();

        new_process(&mut memory, 2, 0, OomPolicy::Retain).unwrap();
        let table = new_process(&mut memory, 3, 0, OomPolicy::Retain).unwrap();
        assert_eq!(table, PhysFrame::from_index(2));
        assert_eq!(read_entry(&memory, table, 0), Ok(PageTableEntry::Unmapped));
        assert_eq!(mapped_entries(&memory, table), Ok(vec![]));
    }
}
