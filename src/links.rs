//! # Link Fetcher
//!
//! Turns a pasted Spotify link — playlist, album, or artist — into a
//! fully materialized `Vec<Track>` by paging through the Web API.
//!
//! Every listing endpoint is paginated the same way: a page object with
//! an `items` array, an `offset`, and an absolute `next` URL (or null on
//! the last page). Some endpoints return the page object directly, some
//! nest it under `"tracks"`/`"albums"`; [`page_object`] normalizes that.

use anyhow::{bail, Result};
use log::{debug, info};
use serde_json::Value;

use crate::spotify::SpotifyApi;
use crate::track::Track;

/// What a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Artist,
    Album,
    Playlist,
}

/// Parse a Spotify link into its category and id.
///
/// Accepts full `https://open.spotify.com/playlist/<id>?si=...` links as
/// well as the bare `playlist/<id>` form. Returns `None` for anything
/// else.
pub fn parse_link(link: &str) -> Option<(LinkKind, String)> {
    let link = link.trim();
    let rest = link
        .strip_prefix("https://open.spotify.com/")
        .or_else(|| link.strip_prefix("http://open.spotify.com/"))
        .or_else(|| link.strip_prefix("open.spotify.com/"))
        .unwrap_or(link);

    let (category, id_part) = rest.split_once('/')?;
    let kind = match category {
        "artist" => LinkKind::Artist,
        "album" => LinkKind::Album,
        "playlist" => LinkKind::Playlist,
        _ => return None,
    };

    // The id runs up to the query string (or any other punctuation).
    let id: String = id_part
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    (!id.is_empty()).then_some((kind, id))
}

/// Track collector for one kind of link, driving the paginated API.
pub struct LinkFetcher<'a> {
    api: &'a SpotifyApi,
}

impl<'a> LinkFetcher<'a> {
    pub fn new(api: &'a SpotifyApi) -> Self {
        Self { api }
    }

    /// Fetch every track behind `link`.
    pub fn fetch(&self, link: &str) -> Result<Vec<Track>> {
        let Some((kind, id)) = parse_link(link) else {
            bail!("Invalid link: {link}");
        };

        let tracks = match kind {
            LinkKind::Playlist => self.playlist_tracks(&id)?,
            LinkKind::Album => self.album_tracks(&id)?,
            LinkKind::Artist => self.artist_tracks(&id)?,
        };

        info!("Fetched {} tracks from {kind:?} {id}", tracks.len());
        Ok(tracks)
    }

    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let mut url = format!("playlists/{playlist_id}/tracks");
        let mut tracks = Vec::new();

        loop {
            let data = self.api.get_json(&url)?;
            let (page_tracks, next) = playlist_page(&data);
            tracks.extend(page_tracks);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(tracks)
    }

    fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>> {
        let mut url = format!("albums/{album_id}/tracks");
        let mut tracks = Vec::new();

        loop {
            let data = self.api.get_json(&url)?;
            let (page_tracks, next) = album_page(&data);
            tracks.extend(page_tracks);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(tracks)
    }

    /// An artist link expands to every track of every release: page
    /// through the artist's albums, then fetch each album's tracklist.
    fn artist_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        let mut url = format!("artists/{artist_id}/albums");
        let mut tracks = Vec::new();

        loop {
            let data = self.api.get_json(&url)?;
            let (album_ids, next) = artist_albums_page(&data);

            for album_id in album_ids {
                tracks.extend(self.album_tracks(&album_id)?);
            }

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(tracks)
    }
}

/// The page object is the payload itself when it carries `offset`,
/// otherwise it is nested under `key` (the listing endpoints differ).
fn page_object<'v>(data: &'v Value, key: &str) -> &'v Value {
    if data.get("offset").is_some() {
        data
    } else {
        data.get(key).unwrap_or(data)
    }
}

fn next_url(page: &Value) -> Option<String> {
    page.get("next").and_then(Value::as_str).map(str::to_string)
}

/// Playlist items wrap the track object under `"track"`.
fn playlist_page(data: &Value) -> (Vec<Track>, Option<String>) {
    let page = page_object(data, "tracks");
    let tracks = items(page)
        .filter_map(|item| item.get("track"))
        .filter_map(parse_track)
        .collect();
    (tracks, next_url(page))
}

/// Album items are track objects directly.
fn album_page(data: &Value) -> (Vec<Track>, Option<String>) {
    let page = page_object(data, "tracks");
    let tracks = items(page).filter_map(parse_track).collect();
    (tracks, next_url(page))
}

fn artist_albums_page(data: &Value) -> (Vec<String>, Option<String>) {
    let page = page_object(data, "albums");
    let ids = items(page)
        .filter_map(|album| album.get("id"))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (ids, next_url(page))
}

fn items(page: &Value) -> impl Iterator<Item = &Value> {
    page.get("items")
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or(&[])
        .iter()
}

fn parse_track(value: &Value) -> Option<Track> {
    let track = Track::from_api_value(value);
    if track.is_none() {
        debug!("Skipping unparseable track entry");
    }
    track
}
