//! # Queue Settings
//!
//! Per-queue playback and filtering configuration. Created with defaults
//! when a queue is created, mutated only through the interactive settings
//! dialog in [`crate::menu`], and persisted as part of the queue snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode for the newness and uniqueness filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Stage disabled.
    Off,
    /// Filter keyed by track id.
    Track,
    /// Filter keyed by artist ids.
    Artist,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::Off => "OFF",
            FilterMode::Track => "track",
            FilterMode::Artist => "artist",
        };
        write!(f, "{name}")
    }
}

/// Settings for one preview queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds each track plays before the queue auto-advances.
    pub listen_time: u64,
    /// Drop tracks/artists already listened to.
    pub new: FilterMode,
    /// Drop duplicate tracks/artists within the queue itself.
    pub unique: FilterMode,
    /// Shuffle the queue after filtering.
    pub shuffle: bool,
    /// Playlist id that accepted tracks are appended to.
    pub destination_playlist: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_time: 7,
            new: FilterMode::Track,
            unique: FilterMode::Track,
            shuffle: false,
            destination_playlist: None,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Listen time: {}", self.listen_time)?;
        writeln!(f, "  New: {}", self.new)?;
        writeln!(f, "  Unique: {}", self.unique)?;
        writeln!(f, "  Shuffle: {}", self.shuffle)?;
        write!(
            f,
            "  Destination playlist: {}",
            self.destination_playlist.as_deref().unwrap_or("None")
        )
    }
}
