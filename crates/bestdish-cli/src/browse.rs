//! Interactive browsing loop.
//!
//! Wires the location feed into the nearby service and the service's
//! results into the debounced search filter. Stdin lines drive the session:
//! plain text replaces the query, `:`-prefixed lines are commands.

use std::sync::Arc;
use std::time::Duration;

use bestdish_core::{AppConfig, Coordinate, LocationFeed};
use bestdish_search::{SearchHandle, SearchState};
use bestdish_yelp::{NearbyService, NearbyUpdate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::nearby::print_businesses;

const HELP: &str = "type to filter by name | :at LAT LON to move | :pick ID | :clear | :deny | :q";

#[derive(Debug, PartialEq)]
enum Input {
    Query(String),
    MoveTo(Coordinate),
    Pick(String),
    ClearSelection,
    Deny,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_owned());
    };

    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("q" | "quit") => Input::Quit,
        Some("clear") => Input::ClearSelection,
        Some("deny") => Input::Deny,
        Some("pick") => match parts.next() {
            Some(id) => Input::Pick(id.to_owned()),
            None => Input::Invalid("usage: :pick ID".to_owned()),
        },
        Some("at") => {
            let lat = parts.next().and_then(|s| s.parse::<f64>().ok());
            let lon = parts.next().and_then(|s| s.parse::<f64>().ok());
            match (lat, lon) {
                (Some(lat), Some(lon)) if Coordinate::new(lat, lon).is_valid() => {
                    Input::MoveTo(Coordinate::new(lat, lon))
                }
                _ => Input::Invalid("usage: :at LAT LON (decimal degrees)".to_owned()),
            }
        }
        _ => Input::Invalid(format!("unknown command; {HELP}")),
    }
}

/// Runs until stdin closes or `:q` is entered.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or a background task panics.
pub(crate) async fn run_browse(
    service: Arc<NearbyService>,
    config: &AppConfig,
    start: Coordinate,
) -> anyhow::Result<()> {
    let feed = LocationFeed::new();
    let (updates_tx, mut updates) = mpsc::channel(4);
    let locations = feed.subscribe();
    let runner = tokio::spawn(async move { service.run(locations, updates_tx).await });

    let (search, _search_task) =
        SearchHandle::spawn(Duration::from_millis(config.search_debounce_ms));
    let mut state = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    feed.publish(start);

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => apply_update(update, &search)?,
                None => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                render(&snapshot);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(line.trim_end()) {
                    Input::Quit => break,
                    Input::Query(text) => search.set_query(text)?,
                    Input::MoveTo(coord) => {
                        println!("moving to {coord}");
                        feed.publish(coord);
                    }
                    Input::Pick(id) => search.select(id)?,
                    Input::ClearSelection => search.clear_selection()?,
                    Input::Deny => feed.deny(),
                    Input::Invalid(message) => eprintln!("{message}"),
                }
            }
        }
    }

    // Closing the feed stops the service; dropping the receiver unblocks a
    // pending send.
    drop(feed);
    drop(updates);
    runner.await?;
    Ok(())
}

fn apply_update(update: NearbyUpdate, search: &SearchHandle) -> anyhow::Result<()> {
    match update {
        NearbyUpdate::Businesses { generation, result } => {
            tracing::debug!(
                generation,
                count = result.businesses.len(),
                source = ?result.source,
                "nearby list updated"
            );
            if result.pages_failed > 0 {
                eprintln!(
                    "warning: {} page(s) failed; list may be incomplete",
                    result.pages_failed
                );
            }
            println!(
                "{} restaurants near {}",
                result.businesses.len(),
                result.origin
            );
            search.set_full_list(result.businesses)?;
        }
        NearbyUpdate::FetchFailed {
            generation,
            origin,
            error,
        } => {
            tracing::warn!(generation, %origin, error = %error, "nearby fetch failed");
            eprintln!("could not load restaurants near {origin}: {error}");
        }
        NearbyUpdate::PermissionDenied => {
            eprintln!("location access denied; use :at LAT LON to set one");
        }
    }
    Ok(())
}

fn render(state: &SearchState) {
    if state.query.is_empty() {
        println!("-- all {} --", state.full_list.len());
    } else {
        println!(
            "-- {} of {} matching {:?} --",
            state.filtered_list.len(),
            state.full_list.len(),
            state.query
        );
    }
    print_businesses(&state.filtered_list);
    if let Some(selected) = &state.selected {
        println!("selected: {} ({})", selected.name, selected.display_location());
    }
}
