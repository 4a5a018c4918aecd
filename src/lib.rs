#![cfg_attr(feature = "strict", deny(warnings))]

pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod machine;
pub mod memory;
pub mod processes;

pub use config::Config;
pub use error::{CommandError, MemoryError};
pub use machine::Machine;
