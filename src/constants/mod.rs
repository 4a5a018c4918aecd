//! Simulator-wide constants and memory geometry.

pub mod memory;
pub mod processes;
