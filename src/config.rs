//! # Configuration Module
//!
//! Data-directory management for Audition. All durable state lives in the
//! platform-standard data directory:
//!
//! - Linux: `~/.local/share/audition/`
//! - macOS: `~/Library/Application Support/audition/`
//! - Windows: `%APPDATA%\audition\`
//!
//! Layout inside that directory:
//!
//! - `queues/<name>.json` — saved queue snapshots
//! - `listened_tracks.json`, `listened_artists.json` — listening history
//! - `token.json` — cached API bearer token

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Returns the Audition data directory, creating it if needed.
///
/// # Errors
///
/// Fails if the platform data directory cannot be determined or the
/// subdirectory cannot be created (permissions, read-only filesystem).
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!("Could not determine system data directory for this platform.")
    })?;

    let dir = base.join("audition");
    fs::create_dir_all(&dir).with_context(|| {
        format!(
            "Failed to create Audition data directory at {}. Please check file permissions.",
            dir.display()
        )
    })?;

    Ok(dir)
}

/// Returns the queue snapshot directory (`<data>/audition/queues`),
/// creating it if needed.
pub fn queues_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("queues");
    fs::create_dir_all(&dir).with_context(|| {
        format!("Failed to create queue directory at {}.", dir.display())
    })?;
    Ok(dir)
}

/// Path of the cached bearer token.
pub fn token_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("token.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_shape() {
        let dir = data_dir().expect("Should resolve data dir");
        assert!(dir.is_absolute());
        assert_eq!(dir.file_name().unwrap(), "audition");
        assert!(dir.is_dir());
    }

    #[test]
    fn test_queues_dir_nested_under_data_dir() {
        let dir = queues_dir().expect("Should resolve queues dir");
        assert_eq!(dir.file_name().unwrap(), "queues");
        assert_eq!(dir.parent().unwrap(), data_dir().unwrap());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_consistent_results() {
        assert_eq!(data_dir().unwrap(), data_dir().unwrap());
        assert_eq!(token_path().unwrap(), token_path().unwrap());
    }
}
