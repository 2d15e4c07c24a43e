//! # Preview Player
//!
//! The real "play a track" side effect: hand the preview URL to the
//! system browser and let it stream the 30-second clip. Fire-and-forget;
//! the session neither waits for nor inspects the result beyond logging.

use log::{debug, error};

use crate::session::PreviewPlayer;

/// Plays previews by opening them in the default browser.
#[derive(Debug, Default)]
pub struct BrowserPlayer;

impl PreviewPlayer for BrowserPlayer {
    fn play(&self, preview_url: &str) {
        debug!("Opening preview {preview_url}");
        if let Err(e) = webbrowser::open(preview_url) {
            // Not fatal: the dwell timer still runs and the queue still
            // advances, the user just hears nothing for this track.
            error!("Could not open preview in browser: {e}");
        }
    }
}
