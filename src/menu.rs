//! # Interactive Menus
//!
//! The whole user-facing surface: the start dialog, the per-queue main
//! menu, the settings dialog, and the add-tracks submenu. This module
//! owns stdin; the playback session gets its input relayed through a
//! channel (see [`spawn_input_reader`]) so the menus and the session
//! never fight over the terminal.
//!
//! Error discipline follows the rest of the program: invalid entries
//! re-prompt locally, collaborator failures (network, API) are printed
//! and control returns to the menu, and only persistence problems
//! propagate out.

use anyhow::{Context, Result};
use log::debug;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::discover::{self, Selector};
use crate::filter;
use crate::history::History;
use crate::links::{parse_link, LinkFetcher, LinkKind};
use crate::player::BrowserPlayer;
use crate::playlist::SpotifyPlaylist;
use crate::queue::Queue;
use crate::session::{InputEvent, Session};
use crate::settings::{FilterMode, Settings};
use crate::spotify::SpotifyApi;
use crate::store::{QueueStore, SaveGuard};
use crate::track::Track;

/// Top-level interactive loop: pick or create a queue, drive its menu,
/// repeat until the user exits.
pub fn run(store: &QueueStore, history: &mut History, api: &SpotifyApi) -> Result<()> {
    loop {
        println!(
            "\n** You have listened to {} tracks in total! **",
            history.track_count()
        );

        let Some(queue) = start_dialog(store, history, api)? else {
            return Ok(());
        };

        // The guard persists the queue on every exit path from here on,
        // including panics and propagated errors.
        let mut guard = SaveGuard::new(store, queue);
        main_menu(&mut guard, store, history, api)?;
    }
}

/// Ask for a new or saved queue. `None` means the user wants out.
fn start_dialog(
    store: &QueueStore,
    history: &mut History,
    api: &SpotifyApi,
) -> Result<Option<Queue>> {
    match select_from_list(&["New queue", "Load queue"], "Exit")? {
        None => Ok(None),
        Some(0) => {
            let name = prompt_queue_name()?;

            // A name clash means the user almost certainly wants to
            // resume; don't silently shadow the old snapshot.
            if let Some(existing) = store.load(&name)? {
                println!("Queue '{name}' already exists, loading it instead.");
                return Ok(Some(existing));
            }

            let mut queue = Queue::new(&name);
            settings_dialog(&mut queue.settings)?;
            add_submenu(&mut queue, history, api)?;
            Ok(Some(queue))
        }
        Some(_) => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No saved queues.");
                return Ok(None);
            }

            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let Some(index) = select_from_list(&refs, "Cancel")? else {
                return Ok(None);
            };

            match store.load(&names[index])? {
                Some(queue) => {
                    println!("Loaded queue {}", queue.name);
                    Ok(Some(queue))
                }
                None => {
                    // Deleted between list and load; treat like cancel.
                    println!("Queue '{}' no longer exists.", names[index]);
                    Ok(None)
                }
            }
        }
    }
}

fn prompt_queue_name() -> Result<String> {
    loop {
        let name = prompt("Name: ")?;
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name.contains(['/', '\\']) {
            println!("Invalid name: {name}");
            continue;
        }
        return Ok(name.to_string());
    }
}

/// The per-queue main menu.
fn main_menu(
    queue: &mut Queue,
    store: &QueueStore,
    history: &mut History,
    api: &SpotifyApi,
) -> Result<()> {
    loop {
        println!("\n{}", title("Main Menu"));
        println!("\nCurrent queue: {} tracks\n", queue.len());

        // "Run queue" only shows up when there is something to run.
        let runnable = !queue.is_empty();
        let mut options: Vec<&str> = Vec::new();
        if runnable {
            options.push("Run queue");
        }
        options.extend(["Change settings", "Add tracks", "Clear queue", "Delete queue"]);

        let Some(index) = select_from_list(&options, "Exit")? else {
            return Ok(());
        };
        let action = if runnable { index } else { index + 1 };

        match action {
            0 => run_queue(queue, history, api)?,
            1 => settings_dialog(&mut queue.settings)?,
            2 => add_submenu(queue, history, api)?,
            3 => {
                if yn("Are you sure you want to clear the queue?")? {
                    queue.tracks.clear();
                }
            }
            _ => {
                if yn("Are you sure you want to delete the queue?")? {
                    store.delete(queue)?;
                    println!("Deleted queue {}", queue.name);
                    return Ok(());
                }
            }
        }
    }
}

/// Run one playback session over the queue.
fn run_queue(queue: &mut Queue, history: &mut History, api: &SpotifyApi) -> Result<()> {
    println!("\nEnter a track number to add it to your playlist, or 'fin' to finish.");

    let player = BrowserPlayer;
    let sink = SpotifyPlaylist::new(api, queue.settings.destination_playlist.clone());

    let (tx, rx) = mpsc::channel();
    let reader = spawn_input_reader(tx);

    Session::new(queue, history, &player, &sink).run(rx)?;

    reader.join().ok();
    Ok(())
}

/// Relay stdin lines to the session as [`InputEvent`]s. The thread ends
/// after forwarding a finish (or on EOF, which sends one itself so the
/// session never hangs).
fn spawn_input_reader(tx: Sender<InputEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match InputEvent::parse(&line) {
                Some(event) => {
                    let finish = event == InputEvent::Finish;
                    if tx.send(event).is_err() || finish {
                        return;
                    }
                }
                None => println!("Invalid input: {line}"),
            }
        }
        debug!("stdin closed, finishing session");
        let _ = tx.send(InputEvent::Finish);
    })
}

/// Interactive settings update. Empty input keeps the current value of
/// each field.
fn settings_dialog(settings: &mut Settings) -> Result<()> {
    println!("\nCurrent settings:\n{settings}");

    println!("\nThe playlist to which liked tracks will be saved (link or id)");
    if let Some(id) = prompt_playlist_id()? {
        settings.destination_playlist = Some(id);
    }

    println!("\nListen time (1-30) | Current: {}", settings.listen_time);
    if let Some(seconds) = prompt_listen_time()? {
        settings.listen_time = seconds;
    }

    println!("\nOnly include unique (not more than one of)... | Current: {}", settings.unique);
    if let Some(mode) = prompt_filter_mode()? {
        settings.unique = mode;
    }

    println!("\nOnly include new (not yet listened to)... | Current: {}", settings.new);
    if let Some(mode) = prompt_filter_mode()? {
        settings.new = mode;
    }

    println!("\nShuffle tracks? | Current: {}", settings.shuffle);
    if let Some(shuffle) = prompt_optional_yn()? {
        settings.shuffle = shuffle;
    }

    println!("\nUpdated settings:\n{settings}");
    Ok(())
}

fn prompt_playlist_id() -> Result<Option<String>> {
    loop {
        let entry = prompt("> ")?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(None);
        }

        if let Some((LinkKind::Playlist, id)) = parse_link(entry) {
            return Ok(Some(id));
        }
        if entry.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(Some(entry.to_string()));
        }

        println!("Invalid input: {entry}");
    }
}

fn prompt_listen_time() -> Result<Option<u64>> {
    loop {
        let entry = prompt("> ")?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(None);
        }
        match entry.parse::<u64>() {
            Ok(seconds) if (1..=30).contains(&seconds) => return Ok(Some(seconds)),
            _ => println!("Invalid input: {entry}"),
        }
    }
}

fn prompt_filter_mode() -> Result<Option<FilterMode>> {
    let modes = [FilterMode::Off, FilterMode::Track, FilterMode::Artist];
    Ok(select_optional_from_list(&["OFF", "track", "artist"])?.map(|i| modes[i]))
}

/// Submenu for appending candidates to the queue. The filter pipeline
/// runs once when the user leaves, over the whole (old + new) list.
fn add_submenu(queue: &mut Queue, history: &mut History, api: &SpotifyApi) -> Result<()> {
    println!("\n{}", title("Add tracks"));

    loop {
        println!();
        let Some(index) = select_from_list(&["Link", "New releases"], "Go back")? else {
            break;
        };

        let tracks = match index {
            0 => add_from_links(api)?,
            _ => add_from_discovery()?,
        };

        println!("Added {} tracks to the queue", tracks.len());
        queue.tracks.extend(tracks);
    }

    let candidates = std::mem::take(&mut queue.tracks);
    queue.tracks = filter::apply(candidates, &queue.settings, history);
    println!("Queue filtered down to {} tracks", queue.len());
    Ok(())
}

/// Collect tracks from pasted links until the user types 'fin'. Fetch
/// failures are reported and skipped; they never abort the loop.
fn add_from_links(api: &SpotifyApi) -> Result<Vec<Track>> {
    let fetcher = LinkFetcher::new(api);
    let mut tracks = Vec::new();

    loop {
        let entry = prompt("\nEnter a URL, or 'fin' to finish\n> ")?;
        let entry = entry.trim();

        if entry == "fin" {
            break;
        }
        if parse_link(entry).is_none() {
            println!("Invalid link: {entry}");
            continue;
        }

        match fetcher.fetch(entry) {
            Ok(found) => {
                println!("Found {} tracks", found.len());
                tracks.extend(found);
            }
            Err(e) => eprintln!("Could not fetch tracks: {e:#}"),
        }
    }

    Ok(tracks)
}

/// Prompt for a discovery-feed selector and fetch its new releases.
fn add_from_discovery() -> Result<Vec<Track>> {
    let mut selector = Selector::default();

    let genre = prompt("Genre (empty for any): ")?;
    if !genre.trim().is_empty() {
        selector.genre = genre.trim().to_string();
    }
    let region = prompt("Region (empty for US): ")?;
    if !region.trim().is_empty() {
        selector.region = region.trim().to_string();
    }
    let date = prompt("Week (YYYYMMDD, empty for latest): ")?;
    if !date.trim().is_empty() {
        selector.date = Some(date.trim().to_string());
    }

    let include_similar = yn("Include similar genres?")?;

    match discover::new_releases(&selector, include_similar) {
        Ok(tracks) => Ok(tracks),
        Err(e) => {
            eprintln!("Could not fetch new releases: {e:#}");
            Ok(Vec::new())
        }
    }
}

/*
 * Prompt helpers
 */

fn title(text: &str) -> String {
    let divider = "=".repeat(text.len());
    format!("{divider}\n{text}\n{divider}")
}

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush().ok();

    let mut line = String::new();
    let read = io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        anyhow::bail!("stdin closed");
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Numbered selection with a `0: <zeroth>` escape entry. Returns the
/// selected index into `items`, or `None` for the escape.
fn select_from_list(items: &[&str], zeroth: &str) -> Result<Option<usize>> {
    println!("0: {zeroth}");
    for (i, item) in items.iter().enumerate() {
        println!("{}: {item}", i + 1);
    }

    loop {
        let entry = prompt("> ")?;
        match entry.trim().parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= items.len() => return Ok(Some(n - 1)),
            _ => println!("Invalid input: {}", entry.trim()),
        }
    }
}

/// Numbered selection where empty input means "keep the current value".
fn select_optional_from_list(items: &[&str]) -> Result<Option<usize>> {
    for (i, item) in items.iter().enumerate() {
        println!("{}: {item}", i + 1);
    }

    loop {
        let entry = prompt("> ")?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(None);
        }
        match entry.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("Invalid input: {entry}"),
        }
    }
}

/// Yes/no prompt.
fn yn(question: &str) -> Result<bool> {
    loop {
        let entry = prompt(&format!("{question} [y/n]: "))?;
        match entry.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            other => println!("Invalid value: {other}. Please enter 'y' or 'n'."),
        }
    }
}

/// Yes/no prompt where empty input means "no change".
fn prompt_optional_yn() -> Result<Option<bool>> {
    loop {
        let entry = prompt("[y/n, empty keeps current]: ")?;
        match entry.trim() {
            "" => return Ok(None),
            "y" | "Y" => return Ok(Some(true)),
            "n" | "N" => return Ok(Some(false)),
            other => println!("Invalid value: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_shape() {
        assert_eq!(title("Main Menu"), "=========\nMain Menu\n=========");
    }
}
