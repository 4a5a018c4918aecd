pub const PAGE_SIZE: usize = 256;
pub const PAGE_COUNT: usize = 64;
pub const PAGE_SHIFT: u32 = 8;
pub const MEM_SIZE: usize = PAGE_SIZE * PAGE_COUNT;

// Page 0 layout: free page bitmap at [0, PAGE_COUNT), process table right after.
pub const BITMAP_OFFSET: usize = 0;
pub const PROCESS_TABLE_OFFSET: usize = 64;

/// Each page table is one page of one-byte entries.
pub const PAGE_TABLE_ENTRIES: usize = PAGE_SIZE;

/// Raw byte an allocator reports when no page is free. Never stored in memory.
pub const OOM_SENTINEL: u8 = 0xFF;

pub const FRAME_FREE: u8 = 0;
pub const FRAME_USED: u8 = 1;

const _: () = assert!(PAGE_SIZE == 1 << PAGE_SHIFT);
const _: () = assert!(PROCESS_TABLE_OFFSET >= BITMAP_OFFSET + PAGE_COUNT);
const _: () = assert!(PAGE_COUNT < OOM_SENTINEL as usize);
