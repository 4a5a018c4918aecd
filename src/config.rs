//! Run configuration

use log::LevelFilter;

use crate::processes::OomPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub oom_policy: OomPolicy,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oom_policy: OomPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

/// Debug builds log at Debug, release builds at Info.
pub const fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
