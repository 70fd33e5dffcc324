//! Configuration loading for Mailscout applications
//!
//! Locates the shared Mailscout config directory (~/.config/mailscout/) and
//! reads/writes JSON configuration files inside it. Components keep their
//! tunables in their own files (e.g. `engine.json`) and load them through
//! this crate at startup.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Get the Mailscout config directory (~/.config/mailscout/)
pub fn dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mailscout"))
}

/// Get the path of a named config file within the Mailscout config directory
pub fn file_path(name: &str) -> Option<PathBuf> {
    dir().map(|p| p.join(name))
}

/// Check whether a named config file exists
pub fn exists(name: &str) -> bool {
    file_path(name).is_some_and(|p| p.exists())
}

/// Create the Mailscout config directory if it is missing, returning its path
pub fn ensure_dir() -> Result<PathBuf> {
    let dir = dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a named JSON config file from the Mailscout config directory
pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
    let path = file_path(name).context("Could not determine config directory")?;
    load_file(&path)
}

/// Load and parse a JSON config file from an arbitrary path
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Save a value as pretty-printed JSON under the Mailscout config directory
pub fn store<T: Serialize>(name: &str, value: &T) -> Result<()> {
    let dir = ensure_dir()?;
    let path = dir.join(name);
    store_file(&path, value)
}

/// Save a value as pretty-printed JSON to an arbitrary path
pub fn store_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
