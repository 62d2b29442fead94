//! Configuration files for Mistbox tools
//!
//! All Mistbox binaries share one config directory (~/.config/mistbox/)
//! holding small JSON files: user settings and the current mailbox session.
//!
//! Call [`init`] at startup to bootstrap the directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Initialize the Mistbox config directory.
///
/// Creates ~/.config/mistbox/ if it doesn't exist.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the Mistbox config directory (~/.config/mistbox/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mistbox"))
}

/// Get the path of a file within the Mistbox config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Check whether a file exists in the Mistbox config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the Mistbox config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a JSON file from the Mistbox config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Save a value as pretty-printed JSON to a file in the Mistbox config directory
pub fn save_json<T: serde::Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    let path = dir.join(filename);
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Remove a file from the Mistbox config directory.
///
/// Removing a file that doesn't exist is not an error.
pub fn remove(filename: &str) -> Result<()> {
    let path = config_path(filename).context("Could not determine config directory")?;
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("mistbox"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("session.json");
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("mistbox/session.json"));
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        assert!(remove("definitely-not-present.json").is_ok());
    }
}
