//! Engine settings
//!
//! Tunables for the search/retrieval engine, loaded from
//! `~/.config/mailscout/engine.json` when present and defaulted otherwise.
//! Protocol constants (page size, proximity window, widening ladder) are
//! fixed in their owning modules and deliberately not configurable.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::remote::RetryPolicy;

/// Settings filename in the Mailscout config directory
pub const SETTINGS_FILE: &str = "engine.json";

/// Engine tunables. Every field has a working default, so a settings file
/// only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Seconds a cached folder resolution stays valid
    pub folder_ttl_secs: u64,
    /// Wall-clock budget for one list/search operation, in seconds
    pub scan_budget_secs: u64,
    /// Items fetched per enumeration batch
    pub scan_batch_size: usize,
    /// Attempts per automation call before giving up
    pub retry_max_attempts: u32,
    /// Delay before the first retry, in milliseconds; doubles per attempt
    pub retry_base_delay_ms: u64,
    /// Batch size at which extraction switches to the worker pool
    pub parallel_threshold: usize,
    /// Worker pool size for parallel derivation
    pub worker_threads: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            folder_ttl_secs: 300,
            scan_budget_secs: 30,
            scan_batch_size: 50,
            retry_max_attempts: 3,
            retry_base_delay_ms: 250,
            parallel_threshold: 20,
            worker_threads: 4,
        }
    }
}

impl EngineSettings {
    /// Load settings from the Mailscout config directory, falling back to
    /// defaults when the file is absent or unreadable
    pub fn load() -> Self {
        if config::exists(SETTINGS_FILE) {
            match config::load(SETTINGS_FILE) {
                Ok(settings) => return settings,
                Err(err) => log::warn!("ignoring unreadable {SETTINGS_FILE}: {err}"),
            }
        }
        Self::default()
    }

    /// Load settings from a specific file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        config::load_file(path)
    }

    /// The retry policy these settings describe
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    /// The scan budget as a duration
    pub fn scan_budget(&self) -> Duration {
        Duration::from_secs(self.scan_budget_secs)
    }
}
