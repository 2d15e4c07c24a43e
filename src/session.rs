//! # Playback Session
//!
//! The concurrent heart of the program. A session owns a queue for one
//! run: it plays each remaining track for a fixed dwell time, advances
//! automatically, and in parallel lets the user accept tracks into a
//! playlist or finish the session.
//!
//! ## Concurrency model
//!
//! There is no shared mutable state and no lock. User input arrives as
//! [`InputEvent`] messages over an `mpsc` channel (fed by a stdin-reader
//! thread, see [`crate::menu`]), and the session loop is the single
//! consumer. `recv_timeout` against the current track's deadline doubles
//! as the dwell sleep, so an accept and the per-track commit can never
//! interleave — they are handled one after another on the same thread.
//!
//! ## The frozen snapshot
//!
//! Track positions shown to the user shift out from under them: by the
//! time they type "12", the queue may have advanced three tracks. Every
//! numeric selection therefore resolves against an immutable snapshot of
//! the queue taken when the session started, never against the live,
//! shrinking queue.
//!
//! ## Commit semantics
//!
//! A track is committed — recorded in the listening history and popped
//! from the queue — when its dwell elapses. If the user finishes while a
//! track is still showing, that track is committed too: it was presented,
//! and history's contract is that presented tracks never reappear.

use anyhow::Result;
use log::{debug, info};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::history::History;
use crate::queue::Queue;
use crate::track::Track;

/// One message from the user to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Accept the track at this 1-based snapshot position.
    Accept(usize),
    /// End the session.
    Finish,
}

impl InputEvent {
    /// Parse one line of user input. `None` means the line was not a
    /// valid entry and the reader should report it and keep going.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line == "fin" {
            return Some(Self::Finish);
        }
        match line.parse::<usize>() {
            Ok(n) if n > 0 => Some(Self::Accept(n)),
            _ => None,
        }
    }
}

/// Fire-and-forget "play this preview" side effect.
pub trait PreviewPlayer {
    fn play(&self, preview_url: &str);
}

/// Destination for accepted tracks.
pub trait PlaylistSink {
    /// Append a track URI, optionally at a position, to the playlist.
    fn append(&self, track_uri: &str, position: Option<u32>) -> Result<()>;
}

/// A single playback run over one queue.
pub struct Session<'a> {
    queue: &'a mut Queue,
    history: &'a mut History,
    player: &'a dyn PreviewPlayer,
    sink: &'a dyn PlaylistSink,
}

impl<'a> Session<'a> {
    pub fn new(
        queue: &'a mut Queue,
        history: &'a mut History,
        player: &'a dyn PreviewPlayer,
        sink: &'a dyn PlaylistSink,
    ) -> Self {
        Self { queue, history, player, sink }
    }

    /// Run the session until the user finishes (or the input channel
    /// closes). Returns with the queue advanced past everything that was
    /// played and the history updated accordingly.
    pub fn run(mut self, events: Receiver<InputEvent>) -> Result<()> {
        let snapshot: Vec<Track> = self.queue.tracks.clone();

        if self.queue.is_empty() {
            println!("\nNo tracks to play!");
        } else {
            println!("Tracks to play: {}", self.queue.len());
        }

        let dwell = Duration::from_secs(self.queue.settings.listen_time);
        let mut position = 1usize;
        let mut finished = false;

        while !finished && !self.queue.is_empty() {
            let track = self.queue.tracks[0].clone();
            if let Some(url) = &track.preview_url {
                self.player.play(url);
            }
            println!("#{position:4}: {track}");

            // Dwell on this track, serving input as it arrives.
            let deadline = Instant::now() + dwell;
            loop {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match events.recv_timeout(timeout) {
                    Ok(InputEvent::Accept(n)) => self.accept(n, &snapshot),
                    Ok(InputEvent::Finish) => {
                        finished = true;
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Input channel closed, finishing session");
                        finished = true;
                        break;
                    }
                }
            }

            // Commit: the track was presented, so it counts as listened
            // even when a finish cut the dwell short.
            self.history.record(&track)?;
            self.queue.tracks.remove(0);
            position += 1;
        }

        if !finished {
            // Queue drained naturally (or was empty to begin with). Keep
            // serving accepts — the user may still want the last track
            // they heard — until they finish.
            loop {
                match events.recv() {
                    Ok(InputEvent::Accept(n)) => self.accept(n, &snapshot),
                    Ok(InputEvent::Finish) | Err(_) => break,
                }
            }
        }

        info!(
            "Session over: {} tracks remaining in queue '{}'",
            self.queue.len(),
            self.queue.name
        );
        Ok(())
    }

    /// Resolve a 1-based selection against the frozen snapshot and send
    /// it to the playlist sink. Both failure modes — an out-of-range
    /// number and a sink error — are reported and recovered locally.
    fn accept(&self, selection: usize, snapshot: &[Track]) {
        let Some(track) = resolve(snapshot, selection) else {
            println!("Invalid number: {selection}");
            return;
        };

        match self.sink.append(&track.uri(), None) {
            Ok(()) => println!("Added to playlist: {track}"),
            Err(e) => eprintln!("Could not add to playlist: {e:#}"),
        }
    }
}

/// Map a 1-based user selection to the track it referred to when the
/// session began.
fn resolve(snapshot: &[Track], selection: usize) -> Option<&Track> {
    selection.checked_sub(1).and_then(|i| snapshot.get(i))
}
