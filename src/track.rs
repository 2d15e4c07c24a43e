//! # Track Value Type
//!
//! The one record every other module trades in: a minimal, immutable view
//! of a Spotify track. Candidate suppliers produce these, the filter
//! pipeline reduces them, and the playback session consumes them.
//!
//! Identity is the track id alone — two `Track`s with the same id are
//! interchangeable even if their names or preview URLs differ (the same
//! track can be scraped from several sources with slightly different
//! metadata).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

/// URI prefix used when appending a track to a playlist.
pub const URI_PREFIX: &str = "spotify:track:";

/// A single playable track and its artists.
///
/// `preview_url` is optional: tracks without one exist in the wild and
/// can never be played, so the filter pipeline drops them up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Stable Spotify track id. Sole source of identity.
    pub id: String,
    /// Track title.
    pub name: String,
    /// `(artist_id, artist_name)` pairs, at least one.
    pub artists: Vec<(String, String)>,
    /// 30-second preview URL, if the track has one.
    pub preview_url: Option<String>,
}

impl Track {
    /// Track URI, used when adding the track to a playlist.
    pub fn uri(&self) -> String {
        format!("{URI_PREFIX}{}", self.id)
    }

    /// Every artist id involved in the track.
    pub fn artist_ids(&self) -> Vec<&str> {
        self.artists.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Every artist name involved in the track.
    pub fn artist_names(&self) -> Vec<&str> {
        self.artists.iter().map(|(_, name)| name.as_str()).collect()
    }

    /// Build a `Track` from a Spotify API track object.
    ///
    /// Returns `None` when the object is missing an id, a name, or any
    /// artist — such entries do occasionally appear in playlist payloads
    /// (local files, removed tracks) and callers skip them.
    pub fn from_api_value(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?.to_string();
        let name = value.get("name")?.as_str()?.to_string();

        let artists: Vec<(String, String)> = value
            .get("artists")?
            .as_array()?
            .iter()
            .filter_map(|artist| {
                let artist_id = artist.get("id")?.as_str()?.to_string();
                let artist_name = artist.get("name")?.as_str()?.to_string();
                Some((artist_id, artist_name))
            })
            .collect();

        if artists.is_empty() {
            return None;
        }

        let preview_url = value
            .get("preview_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Some(Self { id, name, artists, preview_url })
    }
}

impl fmt::Display for Track {
    /// `"Primary Artist (feat. Second; Third) - Track Name"`.
    ///
    /// The primary artist is the *last* pair; everything before it is a
    /// featured artist.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.artist_names();
        let primary = names.pop().unwrap_or("Unknown Artist");

        if names.is_empty() {
            write!(f, "{primary} - {}", self.name)
        } else {
            write!(f, "{primary} (feat. {}) - {}", names.join("; "), self.name)
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str, artists: &[(&str, &str)]) -> Track {
        Track {
            id: id.to_string(),
            name: "Song".to_string(),
            artists: artists
                .iter()
                .map(|(i, n)| (i.to_string(), n.to_string()))
                .collect(),
            preview_url: Some("https://p.scdn.co/mp3-preview/abc".to_string()),
        }
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let a = track("t1", &[("a1", "Artist")]);
        let mut b = track("t1", &[("a2", "Different Artist")]);
        b.name = "Different Name".to_string();
        b.preview_url = None;

        assert_eq!(a, b);
        assert_ne!(a, track("t2", &[("a1", "Artist")]));
    }

    #[test]
    fn test_uri_format() {
        let t = track("3BG4XnGpTL4lB79iMWdyAv", &[("a1", "Artist")]);
        assert_eq!(t.uri(), "spotify:track:3BG4XnGpTL4lB79iMWdyAv");
    }

    #[test]
    fn test_display_single_artist() {
        let t = track("t1", &[("a1", "Death Grips")]);
        assert_eq!(t.to_string(), "Death Grips - Song");
    }

    #[test]
    fn test_display_featured_artists() {
        // Last artist is primary, the rest are features.
        let t = track(
            "t1",
            &[("a2", "Meg Myers"), ("a3", "Madonna"), ("a1", "Death Grips")],
        );
        assert_eq!(t.to_string(), "Death Grips (feat. Meg Myers; Madonna) - Song");
    }

    #[test]
    fn test_artist_accessors() {
        let t = track("t1", &[("a1", "One"), ("a2", "Two")]);
        assert_eq!(t.artist_ids(), vec!["a1", "a2"]);
        assert_eq!(t.artist_names(), vec!["One", "Two"]);
    }

    #[test]
    fn test_from_api_value() {
        let value = json!({
            "id": "t1",
            "name": "Song",
            "artists": [{"id": "a1", "name": "Artist"}],
            "preview_url": "https://p.scdn.co/mp3-preview/abc"
        });

        let t = Track::from_api_value(&value).expect("should parse");
        assert_eq!(t.id, "t1");
        assert_eq!(t.artists, vec![("a1".to_string(), "Artist".to_string())]);
        assert_eq!(t.preview_url.as_deref(), Some("https://p.scdn.co/mp3-preview/abc"));
    }

    #[test]
    fn test_from_api_value_null_preview() {
        let value = json!({
            "id": "t1",
            "name": "Song",
            "artists": [{"id": "a1", "name": "Artist"}],
            "preview_url": null
        });

        let t = Track::from_api_value(&value).expect("should parse");
        assert!(t.preview_url.is_none());
    }

    #[test]
    fn test_from_api_value_rejects_missing_fields() {
        assert!(Track::from_api_value(&json!({"name": "Song"})).is_none());
        assert!(Track::from_api_value(&json!({
            "id": "t1",
            "name": "Song",
            "artists": []
        }))
        .is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let t = track("t1", &[("a1", "Artist")]);
        let json = serde_json::to_string(&t).unwrap();
        let back: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
        assert_eq!(t.name, back.name);
    }
}
