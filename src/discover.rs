//! # New-Release Discovery Feed
//!
//! Scrapes everynoise.com's new-releases-by-genre page into `Track`
//! candidates. The page is a plain HTML table: one `<tr>` per release,
//! each carrying a `<span class="play">` tag whose attributes hold the
//! Spotify track id and preview URL, preceded by an artist anchor with a
//! `spotify:artist:` href.
//!
//! Rows from the first `similargenres` marker onward belong to the
//! "similar genres" section at the bottom of the page; callers choose
//! whether to include them.
//!
//! Extraction is a small hand-rolled attribute scanner — the page is
//! machine-generated and regular enough that a full HTML parser would be
//! overkill.

use anyhow::{Context, Result};
use log::info;
use std::time::Duration;

use crate::track::Track;

const FEED_URL: &str = "https://everynoise.com/new_releases_by_genre.cgi";

const TRACK_URI_PREFIX: &str = "spotify:track:";
const ARTIST_URI_PREFIX: &str = "spotify:artist:";

/// What slice of the feed to fetch.
#[derive(Debug, Clone)]
pub struct Selector {
    /// Genre name as everynoise spells it, or `anygenre`.
    pub genre: String,
    /// Region code, e.g. `US`.
    pub region: String,
    /// Release week in `YYYYMMDD` form; the site defaults to the most
    /// recent week when absent.
    pub date: Option<String>,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            genre: "anygenre".to_string(),
            region: "US".to_string(),
            date: None,
        }
    }
}

impl Selector {
    fn url(&self) -> String {
        let mut url = format!(
            "{FEED_URL}?genre={}&region={}&hidedupes=on&style=list",
            urlencoding::encode(&self.genre),
            urlencoding::encode(&self.region),
        );
        if let Some(date) = &self.date {
            url.push_str(&format!("&date={}", urlencoding::encode(date)));
        }
        url
    }
}

/// Fetch the feed for `selector` and extract its tracks.
///
/// `include_similar` keeps the tracks from the similar-genres section at
/// the bottom of the page.
pub fn new_releases(selector: &Selector, include_similar: bool) -> Result<Vec<Track>> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(30))
        .build();

    let url = selector.url();
    info!("Fetching new releases: {url}");

    let html = agent
        .get(&url)
        .call()
        .with_context(|| format!("Failed to fetch new releases from {url}"))?
        .into_string()
        .context("Failed to read new releases page")?;

    let tracks = extract_tracks(&html, include_similar);
    info!("Found {} new releases for genre '{}'", tracks.len(), selector.genre);
    Ok(tracks)
}

/// Walk the page's table rows and build a track per playable row.
fn extract_tracks(html: &str, include_similar: bool) -> Vec<Track> {
    let mut tracks = Vec::new();

    for row in html.split("<tr").skip(1) {
        // Everything after the similar-genres divider belongs to the
        // similar section.
        if row.contains("similargenres") {
            if include_similar {
                continue;
            }
            break;
        }

        if let Some(track) = extract_track(row) {
            tracks.push(track);
        }
    }

    tracks
}

/// Extract one track from a table row fragment, or `None` when the row
/// isn't a release row (header rows, spacer rows).
fn extract_track(row: &str) -> Option<Track> {
    let track_id = attr_value(row, "trackid")?
        .strip_prefix(TRACK_URI_PREFIX)?
        .to_string();
    let preview_url = attr_value(row, "preview_url")
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    // First anchor is the artist (with a spotify:artist: href), second
    // is the track title.
    let anchors = anchor_texts(row);
    let (artist_href, artist_name) = anchors.first()?;
    let artist_id = artist_href.strip_prefix(ARTIST_URI_PREFIX)?.to_string();
    let (_, track_name) = anchors.get(1)?;

    Some(Track {
        id: track_id,
        name: track_name.clone(),
        artists: vec![(artist_id, artist_name.clone())],
        preview_url,
    })
}

/// Value of `name="..."` in an HTML fragment.
fn attr_value<'h>(fragment: &'h str, name: &str) -> Option<&'h str> {
    let marker = format!("{name}=\"");
    let start = fragment.find(&marker)? + marker.len();
    let rest = &fragment[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// `(href, text)` for every `<a ...>text</a>` in a fragment.
fn anchor_texts(fragment: &str) -> Vec<(String, String)> {
    let mut anchors = Vec::new();
    for piece in fragment.split("<a ").skip(1) {
        let Some(href) = attr_value(piece, "href") else { continue };
        let Some(tag_end) = piece.find('>') else { continue };
        let after = &piece[tag_end + 1..];
        let Some(text_end) = after.find('<') else { continue };
        anchors.push((href.to_string(), after[..text_end].trim().to_string()));
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ROW: &str = concat!(
        "><td><a href=\"spotify:artist:0X380XXQSNBYuleKzav5UO\">Nils Frahm</a> ",
        "<a href=\"spotify:album:xyz\">Day</a> ",
        "<span class=\"play\" trackid=\"spotify:track:3BG4XnGpTL4lB79iMWdyAv\" ",
        "preview_url=\"https://p.scdn.co/mp3-preview/abc\"></span>",
        "<input type=\"checkbox\" name=\"t\"></td>"
    );

    fn page(rows: &[&str]) -> String {
        format!("<html><table>{}</table></html>", rows.join(""))
    }

    #[test]
    fn test_selector_url_encodes_params() {
        let selector = Selector {
            genre: "horror punk".to_string(),
            region: "US".to_string(),
            date: Some("20260828".to_string()),
        };
        let url = selector.url();
        assert!(url.starts_with(FEED_URL));
        assert!(url.contains("genre=horror%20punk"));
        assert!(url.contains("region=US"));
        assert!(url.contains("hidedupes=on"));
        assert!(url.contains("date=20260828"));
    }

    #[test]
    fn test_extract_track_from_row() {
        let tracks = extract_tracks(&page(&[&format!("<tr{SAMPLE_ROW}</tr>")]), false);
        assert_eq!(tracks.len(), 1);

        let t = &tracks[0];
        assert_eq!(t.id, "3BG4XnGpTL4lB79iMWdyAv");
        assert_eq!(t.name, "Day");
        assert_eq!(
            t.artists,
            vec![("0X380XXQSNBYuleKzav5UO".to_string(), "Nils Frahm".to_string())]
        );
        assert_eq!(t.preview_url.as_deref(), Some("https://p.scdn.co/mp3-preview/abc"));
    }

    #[test]
    fn test_rows_without_track_data_are_skipped() {
        let html = page(&["<tr><td>New releases for week of Aug 28</td></tr>"]);
        assert!(extract_tracks(&html, false).is_empty());
    }

    #[test]
    fn test_similar_genres_section_excluded_by_default() {
        let html = page(&[
            &format!("<tr{SAMPLE_ROW}</tr>"),
            "<tr class=\"similargenres\"><td>similar genres</td></tr>",
            &format!("<tr{}</tr>", SAMPLE_ROW.replace("3BG4XnGpTL4lB79iMWdyAv", "similar111")),
        ]);

        let without = extract_tracks(&html, false);
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].id, "3BG4XnGpTL4lB79iMWdyAv");

        let with = extract_tracks(&html, true);
        let ids: Vec<_> = with.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3BG4XnGpTL4lB79iMWdyAv", "similar111"]);
    }

    #[test]
    fn test_missing_preview_url_yields_unplayable_track() {
        let row = SAMPLE_ROW.replace("https://p.scdn.co/mp3-preview/abc", "");
        let tracks = extract_tracks(&page(&[&format!("<tr{row}</tr>")]), false);
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].preview_url.is_none());
    }

    #[test]
    fn test_attr_value() {
        assert_eq!(attr_value("<span trackid=\"abc\">", "trackid"), Some("abc"));
        assert_eq!(attr_value("<span>", "trackid"), None);
    }
}
