//! Environment-driven configuration.
//!
//! Every knob has a compiled-in default; missing or unparsable variables fall
//! back to it silently.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_DELETE_CONFIRM_MS: u64 = 10_000;
pub const DEFAULT_INITIAL_PUBLISH_MS: u64 = 1_000;
pub const DEFAULT_STORAGE_KEY: &str = "tambo-canvas-storage";
pub const DEFAULT_STORAGE_DIR: &str = ".canvasboard";

/// Runtime configuration for the store, the tab bar, and the adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long an operation key stays pending after it is first seen.
    pub debounce_window: Duration,
    /// How long a delete request waits for confirmation before auto-cancelling.
    pub delete_confirm_window: Duration,
    /// Upper bound on waiting for the agent to register an adapter.
    pub initial_publish_window: Duration,
    /// Key of the persisted layout blob.
    pub storage_key: String,
    /// Directory used by the file-backed storage.
    pub storage_dir: PathBuf,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debounce_window: Duration::from_millis(env_parse("CANVAS_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)),
            delete_confirm_window: Duration::from_millis(env_parse("CANVAS_DELETE_CONFIRM_MS", DEFAULT_DELETE_CONFIRM_MS)),
            initial_publish_window: Duration::from_millis(env_parse("CANVAS_INITIAL_PUBLISH_MS", DEFAULT_INITIAL_PUBLISH_MS)),
            storage_key: env_string("CANVAS_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            storage_dir: PathBuf::from(env_string("CANVAS_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            delete_confirm_window: Duration::from_millis(DEFAULT_DELETE_CONFIRM_MS),
            initial_publish_window: Duration::from_millis(DEFAULT_INITIAL_PUBLISH_MS),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}
