//! # Playlist Sink
//!
//! The destination for accepted tracks: appends track URIs to a Spotify
//! playlist via the Web API. This is the real implementation of the
//! [`crate::session::PlaylistSink`] seam.

use anyhow::Result;
use log::info;
use serde_json::json;

use crate::session::PlaylistSink;
use crate::spotify::{require_playlist_id, SpotifyApi};

/// Appends tracks to one configured playlist.
pub struct SpotifyPlaylist<'a> {
    api: &'a SpotifyApi,
    playlist_id: Option<String>,
}

impl<'a> SpotifyPlaylist<'a> {
    pub fn new(api: &'a SpotifyApi, playlist_id: Option<String>) -> Self {
        Self { api, playlist_id }
    }
}

impl PlaylistSink for SpotifyPlaylist<'_> {
    fn append(&self, track_uri: &str, position: Option<u32>) -> Result<()> {
        let playlist_id = require_playlist_id(self.playlist_id.as_deref())?;

        let mut body = json!({ "uris": [track_uri] });
        if let Some(position) = position {
            body["position"] = json!(position);
        }

        self.api
            .post_json(&format!("playlists/{playlist_id}/tracks"), body)?;

        info!("Appended {track_uri} to playlist {playlist_id}");
        Ok(())
    }
}
