//! Error types for the paging simulator

use core::fmt;

use thiserror::Error;

/// Which allocation of `new_process` ran out of pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OomStage {
    PageTable,
    DataPage,
}

impl fmt::Display for OomStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OomStage::PageTable => write!(f, "page table"),
            OomStage::DataPage => write!(f, "data page"),
        }
    }
}

/// Failures of the core memory operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("OOM: proc {pid}: {stage}")]
    OutOfMemory { pid: usize, stage: OomStage },

    #[error("invalid virtual address {vaddr}: page index exceeds page table")]
    InvalidAddress { vaddr: usize },

    #[error("process {pid} has no page table")]
    UnboundProcess { pid: usize },

    #[error("process {pid}: virtual page {vpage:#04x} is not mapped")]
    UnmappedPage { pid: usize, vpage: usize },

    #[error("process id {pid} out of range")]
    InvalidProcessId { pid: usize },

    #[error("process {pid} already exists")]
    ProcessExists { pid: usize },

    #[error("physical address {addr:#x} out of range")]
    AddressOutOfRange { addr: usize },
}

/// Malformed command lists
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command}: missing operand `{operand}`")]
    MissingOperand {
        command: &'static str,
        operand: &'static str,
    },

    #[error("{command}: invalid {operand} `{value}`")]
    InvalidNumber {
        command: &'static str,
        operand: &'static str,
        value: String,
    },
}
