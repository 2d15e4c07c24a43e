//! # Integration Tests for Audition
//!
//! End-to-end tests that exercise the library the way the program does:
//! queues persisted through the store, history shared across sessions,
//! and full playback runs over the channel-driven session loop.

use std::process::Command;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use tempfile::TempDir;

use audition::history::History;
use audition::queue::Queue;
use audition::session::{InputEvent, PlaylistSink, PreviewPlayer, Session};
use audition::settings::FilterMode;
use audition::store::{QueueStore, SaveGuard};
use audition::track::Track;

/// Test helper to build a track with one artist.
fn track(id: &str, artist_id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {id}"),
        artists: vec![(artist_id.to_string(), format!("Artist {artist_id}"))],
        preview_url: Some(format!("https://p.scdn.co/mp3-preview/{id}")),
    }
}

/// Test helper: store and history rooted in one temporary data dir.
fn test_storage() -> Result<(TempDir, QueueStore, History)> {
    let temp = TempDir::new()?;
    let store = QueueStore::new(&temp.path().join("queues"))?;
    let history = History::load(temp.path())?;
    Ok((temp, store, history))
}

/// Records every preview URL it is asked to play.
#[derive(Default)]
struct RecordingPlayer {
    played: Mutex<Vec<String>>,
}

impl PreviewPlayer for RecordingPlayer {
    fn play(&self, preview_url: &str) {
        self.played.lock().unwrap().push(preview_url.to_string());
    }
}

/// Records appended URIs; optionally fails every call.
#[derive(Default)]
struct RecordingSink {
    appended: Mutex<Vec<String>>,
    fail: bool,
}

impl PlaylistSink for RecordingSink {
    fn append(&self, track_uri: &str, _position: Option<u32>) -> Result<()> {
        if self.fail {
            bail!("playlist service unavailable");
        }
        self.appended.lock().unwrap().push(track_uri.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = Command::new("cargo")
            .args(["run", "--", "--help"])
            .output()
            .expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("audition"));
        assert!(stdout.contains("list"));
        assert!(stdout.contains("stats"));
        assert!(stdout.contains("delete"));
        assert!(stdout.contains("completion"));
    }

    #[test]
    fn test_cli_version_flag() {
        let output = Command::new("cargo")
            .args(["run", "--", "--version"])
            .output()
            .expect("Failed to run version command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("audition"));
        assert!(stdout.contains("1.0"));
    }

    #[test]
    fn test_completion_generation() {
        let output = Command::new("cargo")
            .args(["run", "--", "completion", "bash"])
            .output()
            .expect("Failed to run completion command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_audition"));
        assert!(stdout.contains("complete"));
    }
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_queue_survives_save_and_reload_with_settings() -> Result<()> {
        let (_temp, store, _history) = test_storage()?;

        let mut queue = Queue::new("weekly-finds");
        queue.settings.listen_time = 12;
        queue.settings.unique = FilterMode::Artist;
        queue.settings.destination_playlist = Some("4BaKglpjlo8yoCQccCyZLx".to_string());
        queue.tracks = vec![track("t1", "a1"), track("t2", "a2")];

        store.save(&queue)?;
        let loaded = store.load("weekly-finds")?.expect("queue should exist");

        assert_eq!(loaded.name, "weekly-finds");
        assert_eq!(loaded.settings.listen_time, 12);
        assert_eq!(loaded.settings.unique, FilterMode::Artist);
        assert_eq!(
            loaded.settings.destination_playlist.as_deref(),
            Some("4BaKglpjlo8yoCQccCyZLx")
        );
        assert_eq!(loaded.tracks, queue.tracks);
        Ok(())
    }

    #[test]
    fn test_save_guard_persists_the_session_outcome() -> Result<()> {
        let (_temp, store, _history) = test_storage()?;

        let mut queue = Queue::new("guarded");
        queue.tracks = vec![track("t1", "a1"), track("t2", "a2")];

        {
            let mut guard = SaveGuard::new(&store, queue);
            guard.tracks.remove(0);
        } // drops and saves here

        let loaded = store.load("guarded")?.expect("queue should exist");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.tracks[0].id, "t2");
        Ok(())
    }

    #[test]
    fn test_deleted_queue_is_gone_and_unlisted() -> Result<()> {
        let (_temp, store, _history) = test_storage()?;

        let mut keep = Queue::new("keep");
        let mut gone = Queue::new("gone");
        store.save(&keep)?;
        store.save(&gone)?;

        store.delete(&mut gone)?;

        assert!(store.load("gone")?.is_none());
        assert_eq!(store.list()?, vec!["keep".to_string()]);

        keep.tracks.push(track("t1", "a1"));
        store.save(&keep)?;
        Ok(())
    }
}

#[cfg(test)]
mod history_tests {
    use super::*;

    #[test]
    fn test_history_accumulates_across_loads() -> Result<()> {
        let temp = TempDir::new()?;

        {
            let mut history = History::load(temp.path())?;
            history.record(&track("t1", "a1"))?;
            history.record(&track("t2", "a1"))?;
        }

        // A later program run sees everything the first one recorded.
        let mut history = History::load(temp.path())?;
        assert_eq!(history.track_count(), 2);
        assert_eq!(history.artist_count(), 1);
        assert!(history.contains_track("t1"));
        assert!(history.contains_artist("a1"));

        history.record(&track("t1", "a1"))?; // replay must not duplicate
        assert_eq!(history.track_count(), 2);
        Ok(())
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use audition::filter;

    #[test]
    fn test_filters_apply_history_and_uniqueness_together() -> Result<()> {
        let temp = TempDir::new()?;
        let mut history = History::load(temp.path())?;
        history.record(&track("heard", "a1"))?;

        let mut queue = Queue::new("filtered");
        queue.settings.new = FilterMode::Track;
        queue.settings.unique = FilterMode::Track;

        let candidates = vec![
            track("heard", "a1"),  // already listened
            track("fresh", "a2"),
            track("fresh", "a2"),  // duplicate of the previous
            Track { preview_url: None, ..track("silent", "a3") }, // unplayable
        ];

        let kept = filter::apply(candidates, &queue.settings, &history);
        let ids: Vec<_> = kept.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
        Ok(())
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    /// The full loop: build a queue, run a session that gets interrupted,
    /// persist it, reload it, and finish it in a second session.
    #[test]
    fn test_interrupted_session_resumes_where_it_stopped() -> Result<()> {
        let (_temp, store, mut history) = test_storage()?;

        let mut queue = Queue::new("resume");
        queue.settings.new = FilterMode::Off;
        queue.settings.unique = FilterMode::Off;
        queue.settings.listen_time = 30; // finish will interrupt the first dwell
        queue.tracks = vec![track("t1", "a1"), track("t2", "a2"), track("t3", "a3")];

        // First run: the user bails out while track one is showing.
        {
            let player = RecordingPlayer::default();
            let sink = RecordingSink::default();
            let (tx, rx) = mpsc::channel();
            tx.send(InputEvent::Finish).unwrap();
            drop(tx);

            let mut guard = SaveGuard::new(&store, queue);
            Session::new(&mut guard, &mut history, &player, &sink).run(rx)?;
        }

        // Second run picks up from track two.
        let mut resumed = store.load("resume")?.expect("queue should exist");
        assert_eq!(resumed.len(), 2);
        assert_eq!(resumed.tracks[0].id, "t2");

        resumed.settings.listen_time = 0;
        let player = RecordingPlayer::default();
        let sink = RecordingSink::default();
        let (tx, rx) = mpsc::channel();
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            tx.send(InputEvent::Accept(1)).unwrap();
            tx.send(InputEvent::Finish).unwrap();
        });

        Session::new(&mut resumed, &mut history, &player, &sink).run(rx)?;
        sender.join().unwrap();

        // Selection 1 resolved against this session's snapshot: t2.
        assert_eq!(
            *sink.appended.lock().unwrap(),
            vec!["spotify:track:t2".to_string()]
        );
        assert!(resumed.is_empty());
        assert!(history.contains_track("t1"));
        assert!(history.contains_track("t3"));
        Ok(())
    }

    #[test]
    fn test_sink_failures_do_not_stop_a_session() -> Result<()> {
        let (_temp, _store, mut history) = test_storage()?;

        let mut queue = Queue::new("flaky");
        queue.settings.listen_time = 0;
        queue.settings.new = FilterMode::Off;
        queue.settings.unique = FilterMode::Off;
        queue.tracks = vec![track("t1", "a1"), track("t2", "a2")];

        let player = RecordingPlayer::default();
        let sink = RecordingSink { fail: true, ..RecordingSink::default() };
        let (tx, rx) = mpsc::channel();
        tx.send(InputEvent::Accept(1)).unwrap();
        tx.send(InputEvent::Finish).unwrap();
        drop(tx);

        Session::new(&mut queue, &mut history, &player, &sink).run(rx)?;

        // Nothing was appended, but listening still happened.
        assert!(sink.appended.lock().unwrap().is_empty());
        assert!(history.contains_track("t1"));
        Ok(())
    }
}
