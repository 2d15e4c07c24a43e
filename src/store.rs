//! # Queue Persistence
//!
//! Durable snapshots of whole queues, one JSON file per queue under the
//! `queues/` data subdirectory, keyed by queue name. Saving overwrites
//! any prior snapshot with the same name.
//!
//! [`SaveGuard`] is the guaranteed-on-exit mechanism: it owns the live
//! queue for the duration of the interactive menu and saves it when
//! dropped, which covers normal return, `?` propagation, and panics
//! alike. Errors inside the guard are logged and swallowed — a failed
//! exit-time save must never prevent process exit. Explicit
//! user-initiated saves go through [`QueueStore::save`] directly and
//! surface their errors.

use anyhow::{Context, Result};
use log::{debug, error};
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::queue::Queue;

/// Snapshot storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct QueueStore {
    dir: PathBuf,
}

impl QueueStore {
    /// Open (and create, if needed) the store at `dir`.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create queue directory {}", dir.display()))?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Serialize the full queue state, overwriting any prior snapshot.
    ///
    /// A queue whose `save_enabled` flag has been cleared (i.e. a
    /// deleted queue) is never written; the call is a logged no-op.
    pub fn save(&self, queue: &Queue) -> Result<()> {
        if !queue.save_enabled {
            debug!("Not saving queue '{}': saving disabled", queue.name);
            return Ok(());
        }

        let path = self.snapshot_path(&queue.name);
        let content = serde_json::to_string_pretty(queue)
            .with_context(|| format!("Failed to serialize queue '{}'", queue.name))?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write queue snapshot {}", path.display()))?;

        debug!("Saved queue '{}' ({} tracks)", queue.name, queue.len());
        Ok(())
    }

    /// Load a queue by name. A missing snapshot is the normal
    /// "not found" outcome (`Ok(None)`), not an error; the caller falls
    /// back to creating a new queue. A snapshot that exists but cannot
    /// be parsed is a hard error requiring the user to rename or delete
    /// the file — silently discarding it would lose the queue.
    pub fn load(&self, name: &str) -> Result<Option<Queue>> {
        let path = self.snapshot_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read queue snapshot {}", path.display()))?;
        let queue: Queue = serde_json::from_str(&content).with_context(|| {
            format!(
                "Queue snapshot {} is corrupted or from an incompatible version. \
                 Rename or delete the file to discard it.",
                path.display()
            )
        })?;

        Ok(Some(queue))
    }

    /// Delete a queue: disable saving first, then remove the snapshot.
    ///
    /// The flag flips before the file goes away, so an exit-time
    /// [`SaveGuard`] observing the queue afterwards can never recreate
    /// the snapshot.
    pub fn delete(&self, queue: &mut Queue) -> Result<()> {
        queue.save_enabled = false;

        let path = self.snapshot_path(&queue.name);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete queue snapshot {}", path.display()))?;
        }

        debug!("Deleted queue '{}'", queue.name);
        Ok(())
    }

    /// Names of all saved queues, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read queue directory {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Scoped owner of a live queue that persists it on every exit path.
pub struct SaveGuard<'a> {
    store: &'a QueueStore,
    queue: Queue,
}

impl<'a> SaveGuard<'a> {
    pub fn new(store: &'a QueueStore, queue: Queue) -> Self {
        Self { store, queue }
    }
}

impl Deref for SaveGuard<'_> {
    type Target = Queue;

    fn deref(&self) -> &Queue {
        &self.queue
    }
}

impl DerefMut for SaveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Queue {
        &mut self.queue
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        if !self.queue.save_enabled {
            debug!("Exit save skipped for deleted queue '{}'", self.queue.name);
            return;
        }
        match self.store.save(&self.queue) {
            Ok(()) => println!("Saved queue {}", self.queue.name),
            Err(e) => error!("Failed to save queue '{}' on exit: {e:#}", self.queue.name),
        }
    }
}
