//! # Audition - Preview-Based Playlist Curation
//!
//! Audition plays 30-second previews of queued tracks back to back and
//! lets you pick the keepers into a Spotify playlist as they go by.
//!
//! ## Architecture
//!
//! - `menu`: Interactive menus (the default surface)
//! - `session`: The playback loop and its input channel
//! - `store`/`queue`: Queue snapshots on disk
//! - `history`: Listened tracks and artists
//! - `spotify`/`links`/`discover`: Track sources and the API client
//!
//! ## Usage
//!
//! ```bash
//! # Open the interactive menus
//! audition
//!
//! # Scripting helpers
//! audition list
//! audition stats
//! audition delete weekly-finds
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;

use audition::{cli, completion, config, history, menu, spotify, store};

/// Main entry point.
///
/// Initializes logging, parses command-line arguments, and routes to the
/// interactive menus or one of the scripting subcommands.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug audition` - Enable debug logging
/// - `RUST_LOG=audition::spotify=debug audition` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        None => {
            let data_dir = config::data_dir()?;
            let queue_store = store::QueueStore::new(&config::queues_dir()?)?;
            let mut history = history::History::load(&data_dir)?;
            let api = spotify::SpotifyApi::from_env()?;

            info!("Starting interactive session");
            menu::run(&queue_store, &mut history, &api)?;
        }
        Some(cli::Command::List) => {
            let queue_store = store::QueueStore::new(&config::queues_dir()?)?;
            let names = queue_store.list()?;
            if names.is_empty() {
                println!("No saved queues.");
            }
            for name in names {
                println!("{name}");
            }
        }
        Some(cli::Command::Stats) => {
            let history = history::History::load(&config::data_dir()?)?;
            println!(
                "Listened to {} tracks by {} artists",
                history.track_count(),
                history.artist_count()
            );
        }
        Some(cli::Command::Delete { name }) => {
            let queue_store = store::QueueStore::new(&config::queues_dir()?)?;
            match queue_store.load(&name)? {
                Some(mut queue) => {
                    queue_store.delete(&mut queue)?;
                    println!("Deleted queue {name}");
                }
                None => {
                    anyhow::bail!("No queue named '{name}'");
                }
            }
        }
        Some(cli::Command::Completion { shell }) => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
    }

    Ok(())
}
