//! Curate playlists by listening to 30-second track previews.
//!
//! Core modules:
//! - [`session`] - The playback session: dwell timer, selections, commits
//! - [`queue`] / [`store`] - Named track queues and their JSON snapshots
//! - [`history`] - Listened tracks and artists, across all sessions
//! - [`filter`] - The candidate filter pipeline (playable, new, unique, shuffle)
//!
//! ### Collaborators
//!
//! - [`spotify`] - Authenticated Web API client with token refresh
//! - [`links`] - Pasted playlist/album/artist links to track lists
//! - [`discover`] - New-release scraping from everynoise.com
//! - [`playlist`] - Appending accepted tracks to the destination playlist
//! - [`player`] - Preview playback through the system browser
//!
//! ### Supporting Modules
//!
//! - [`config`] - Data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`menu`] - The interactive menus
//!
//! ## How a session works
//!
//! The queue's tracks play front to back, each for a configurable dwell
//! time. While previews play, the user types the number of any track
//! already shown to add it to the destination playlist, or `fin` to stop.
//! Every track that was shown is recorded as listened and removed from
//! the queue, so an interrupted queue resumes where it left off.
//!
//! ## Error Handling
//!
//! All fallible public functions return `Result<T, anyhow::Error>`.
//! Collaborator failures (network, API) are reported and survived;
//! persistence failures propagate.

pub mod cli;
pub mod completion;
pub mod config;
pub mod discover;
pub mod filter;
pub mod history;
pub mod links;
pub mod menu;
pub mod player;
pub mod playlist;
pub mod queue;
pub mod session;
pub mod settings;
pub mod spotify;
pub mod store;
pub mod track;
