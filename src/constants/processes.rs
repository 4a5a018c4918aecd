use super::memory::{PAGE_SIZE, PROCESS_TABLE_OFFSET};

/// The process table fills the rest of page 0, one byte per process id.
pub const MAX_PROC: usize = PAGE_SIZE - PROCESS_TABLE_OFFSET;
