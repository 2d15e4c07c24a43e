//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Audition using Clap
//! derive macros. The interactive menus are the primary surface; the
//! subcommands exist for scripting and shell integration.
//!
//! ## Commands
//!
//! - (none): Open the interactive menus
//! - `list`: Show the saved queues
//! - `stats`: Show listening history totals
//! - `delete`: Delete a saved queue without opening it
//! - `completion`: Generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! audition
//! audition list
//! audition delete weekly-finds
//! ```

use clap::{Parser, Subcommand, ValueEnum};

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// The subcommand is optional: running bare `audition` opens the
/// interactive menus, which is how the program is normally used.
#[derive(Parser)]
#[command(name = "audition")]
#[command(about = "Audition: Curate playlists by listening to track previews")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute; omit for the interactive menus
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// List saved queues
    ///
    /// Shows the name of every queue snapshot in the data directory,
    /// sorted alphabetically.
    List,

    /// Show listening history totals
    ///
    /// Prints how many tracks and artists have been recorded as
    /// listened across all sessions.
    Stats,

    /// Delete a saved queue
    ///
    /// Removes the named queue snapshot from the data directory.
    /// Listening history is not touched.
    Delete {
        /// Name of the queue to delete
        name: String,
    },

    /// Generate shell completions
    ///
    /// Usage: audition completion bash > ~/.local/share/bash-completion/completions/audition
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
