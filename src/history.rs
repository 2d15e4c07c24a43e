//! # Listening History Store
//!
//! Two durable, append-only id sets shared by every queue: tracks the
//! user has been played, and the artists on those tracks. The filter
//! pipeline reads them; the playback session appends to them exactly once
//! per consumed track.
//!
//! Each write re-serializes the full set to disk (`listened_tracks.json`
//! and `listened_artists.json` under the data directory). That keeps the
//! on-disk state current after every consumed track, so an unexpected
//! termination mid-session loses at most the track currently showing.

use anyhow::{Context, Result};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::track::Track;

const TRACKS_FILE: &str = "listened_tracks.json";
const ARTISTS_FILE: &str = "listened_artists.json";

/// Process-wide listened-id store. Shared by reference across queues;
/// no queue owns it.
#[derive(Debug)]
pub struct History {
    dir: PathBuf,
    tracks: Vec<String>,
    artists: Vec<String>,
    track_set: HashSet<String>,
    artist_set: HashSet<String>,
}

impl History {
    /// Load the history from `dir`. Files that don't exist yet are
    /// treated as empty sets, not as errors — a fresh install has no
    /// history.
    pub fn load(dir: &Path) -> Result<Self> {
        let tracks = read_id_list(&dir.join(TRACKS_FILE))?;
        let artists = read_id_list(&dir.join(ARTISTS_FILE))?;

        debug!(
            "Loaded history: {} tracks, {} artists",
            tracks.len(),
            artists.len()
        );

        let track_set = tracks.iter().cloned().collect();
        let artist_set = artists.iter().cloned().collect();

        Ok(Self {
            dir: dir.to_path_buf(),
            tracks,
            artists,
            track_set,
            artist_set,
        })
    }

    /// Whether this track id has ever been played to the user.
    pub fn contains_track(&self, track_id: &str) -> bool {
        self.track_set.contains(track_id)
    }

    /// Whether this artist id has ever appeared on a played track.
    pub fn contains_artist(&self, artist_id: &str) -> bool {
        self.artist_set.contains(artist_id)
    }

    /// Number of distinct tracks listened to.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of distinct artists listened to.
    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    /// Record one consumed track: its id plus all of its artist ids.
    /// Rewrites both files in full so progress survives a crash.
    pub fn record(&mut self, track: &Track) -> Result<()> {
        if self.track_set.insert(track.id.clone()) {
            self.tracks.push(track.id.clone());
        }
        for (artist_id, _) in &track.artists {
            if self.artist_set.insert(artist_id.clone()) {
                self.artists.push(artist_id.clone());
            }
        }

        self.save()
    }

    fn save(&self) -> Result<()> {
        write_id_list(&self.dir.join(TRACKS_FILE), &self.tracks)?;
        write_id_list(&self.dir.join(ARTISTS_FILE), &self.artists)?;
        Ok(())
    }
}

fn read_id_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| {
        format!(
            "History file {} is not valid JSON. Rename or delete it to start fresh.",
            path.display()
        )
    })
}

fn write_id_list(path: &Path, ids: &[String]) -> Result<()> {
    let content = serde_json::to_string(ids)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write history file {}", path.display()))
}
