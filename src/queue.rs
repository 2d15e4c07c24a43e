//! # Queue State
//!
//! The serializable state of one curation session: a name (also the
//! persistence key), its settings, and the ordered tracks still to play.
//!
//! This type deliberately owns no concurrency primitives — the playback
//! session in [`crate::session`] reconstructs those fresh each run, so a
//! queue can be serialized whole at any time.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::track::Track;

/// One named preview queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    /// Unique name; doubles as the snapshot filename stem.
    pub name: String,
    /// Playback and filtering configuration.
    pub settings: Settings,
    /// Remaining tracks, consumed strictly from the front. Nothing is
    /// ever reinserted once played.
    pub tracks: Vec<Track>,
    /// Once a queue is deleted this goes false and stays false, so no
    /// exit-time save can resurrect the snapshot file.
    pub save_enabled: bool,
}

impl Queue {
    /// New empty queue with default settings.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            settings: Settings::default(),
            tracks: Vec::new(),
            save_enabled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
