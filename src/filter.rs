//! # Filter Pipeline
//!
//! Pure transformation from a raw candidate list to the final playback
//! order. Stages run in a fixed order, each one optional per the queue's
//! settings:
//!
//! 1. **Playable** (always): drop tracks with no preview URL — they
//!    would stall the fixed-dwell playback loop.
//! 2. **Newness**: drop tracks (or tracks whose artists are all) already
//!    in the listening history.
//! 3. **Uniqueness**: deduplicate within the candidate list itself.
//! 4. **Shuffle**: uniform random permutation of the survivors.
//!
//! Apart from the shuffle, output order is the insertion order of the
//! input.

use log::info;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::history::History;
use crate::settings::{FilterMode, Settings};
use crate::track::Track;

/// Run the full pipeline over `candidates` per `settings`.
pub fn apply(candidates: Vec<Track>, settings: &Settings, history: &History) -> Vec<Track> {
    let before = candidates.len();

    let mut tracks = playable(candidates);

    tracks = match settings.new {
        FilterMode::Off => tracks,
        FilterMode::Track => new_tracks(tracks, history),
        FilterMode::Artist => new_artists(tracks, history),
    };

    tracks = match settings.unique {
        FilterMode::Off => tracks,
        FilterMode::Track => unique_tracks(tracks),
        FilterMode::Artist => unique_artists(tracks),
    };

    if settings.shuffle {
        tracks.shuffle(&mut rand::thread_rng());
    }

    info!("Filtered {before} candidates down to {}", tracks.len());
    tracks
}

/// Drop any track without a preview URL. Unconditional: unplayable
/// tracks can never be consumed by the playback loop.
fn playable(tracks: Vec<Track>) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|t| t.preview_url.as_deref().is_some_and(|url| !url.is_empty()))
        .collect()
}

/// Keep only tracks the user has never been played.
fn new_tracks(tracks: Vec<Track>, history: &History) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|t| !history.contains_track(&t.id))
        .collect()
}

/// Keep a track if at least one of its artists is unheard. A track is
/// dropped only when *all* of its artists are in the history.
fn new_artists(tracks: Vec<Track>, history: &History) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|t| !t.artist_ids().iter().all(|id| history.contains_artist(id)))
        .collect()
}

/// Deduplicate by track id, first occurrence wins, order preserved.
fn unique_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen: HashSet<String> = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Greedy left-to-right artist dedup: keep a track only if it introduces
/// at least one artist id not yet seen in this scan, then mark all of its
/// artists as seen.
///
/// This is deliberately order-dependent. Given `[A(artist1),
/// B(artist1, artist2), C(artist2)]`, B survives because artist2 is new
/// at that point, and C is then dropped — the result is `[A, B]`, not
/// `[A, C]`. Do not replace this with a global set-based filter.
fn unique_artists(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen: HashSet<String> = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| {
            let introduces_new = t.artist_ids().iter().any(|id| !seen.contains(*id));
            if introduces_new {
                for id in t.artist_ids() {
                    seen.insert(id.to_string());
                }
            }
            introduces_new
        })
        .collect()
}
