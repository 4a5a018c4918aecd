pub mod process;

pub use process::{kill_process, new_process, OomPolicy};
