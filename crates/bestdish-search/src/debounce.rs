//! Debounced incremental search as a single-task actor.
//!
//! [`SearchHandle`] sends commands over an unbounded channel, so callers
//! never wait. The actor owns the [`SearchState`] and publishes it through
//! a `watch` channel after every change.
//!
//! Query updates arm a deadline `debounce` in the future; every further
//! update pushes the deadline back. Only when it expires is the latest query
//! applied. A full-list update applies the latest query immediately and
//! disarms the deadline.

use std::time::Duration;

use bestdish_core::Business;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::filter::filter_businesses;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Snapshot published after each change.
///
/// `filtered_list` always equals `filter_businesses(&query, &full_list)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Query that produced `filtered_list`; may lag the text being typed.
    pub query: String,
    pub full_list: Vec<Business>,
    pub filtered_list: Vec<Business>,
    /// Always a member of `filtered_list`; dropped when a recompute
    /// filters it out.
    pub selected: Option<Business>,
    /// Number of times `filtered_list` has been recomputed.
    pub revision: u64,
}

#[derive(Debug, Error)]
#[error("search actor has stopped")]
pub struct SearchClosed;

#[derive(Debug)]
enum Command {
    SetQuery(String),
    SetFullList(Vec<Business>),
    Select(String),
    ClearSelection,
}

#[derive(Debug, Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchState>,
}

impl SearchHandle {
    /// Starts the actor on the current runtime. It stops once every handle
    /// has been dropped.
    #[must_use]
    pub fn spawn(debounce: Duration) -> (Self, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let actor = SearchActor {
            debounce,
            typed_query: String::new(),
            deadline: None,
            state: state_tx,
        };
        let task = tokio::spawn(actor.run(commands_rx));
        (
            Self {
                commands: commands_tx,
                state: state_rx,
            },
            task,
        )
    }

    /// Records new query text. The filter catches up after the quiet interval.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClosed`] if the actor is gone.
    pub fn set_query(&self, text: impl Into<String>) -> Result<(), SearchClosed> {
        self.send(Command::SetQuery(text.into()))
    }

    /// Replaces the full list and refilters immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClosed`] if the actor is gone.
    pub fn set_full_list(&self, businesses: Vec<Business>) -> Result<(), SearchClosed> {
        self.send(Command::SetFullList(businesses))
    }

    /// Selects the business with `id` from the current filtered list.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClosed`] if the actor is gone.
    pub fn select(&self, id: impl Into<String>) -> Result<(), SearchClosed> {
        self.send(Command::Select(id.into()))
    }

    /// # Errors
    ///
    /// Returns [`SearchClosed`] if the actor is gone.
    pub fn clear_selection(&self) -> Result<(), SearchClosed> {
        self.send(Command::ClearSelection)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    fn send(&self, command: Command) -> Result<(), SearchClosed> {
        self.commands.send(command).map_err(|_| SearchClosed)
    }
}

struct SearchActor {
    debounce: Duration,
    /// Latest text received, applied or not.
    typed_query: String,
    deadline: Option<Instant>,
    state: watch::Sender<SearchState>,
}

impl SearchActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        tracing::debug!("all search handles dropped, stopping search actor");
                        return;
                    }
                },
                () = sleep_until_armed(deadline), if deadline.is_some() => {
                    self.deadline = None;
                    self.recompute(None);
                }
            }
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetQuery(text) => {
                self.typed_query = text;
                self.deadline = Some(Instant::now() + self.debounce);
            }
            Command::SetFullList(businesses) => {
                self.deadline = None;
                self.recompute(Some(businesses));
            }
            Command::Select(id) => {
                let mut found = true;
                self.state.send_if_modified(|state| {
                    match state.filtered_list.iter().find(|b| b.id == id) {
                        Some(business) => {
                            state.selected = Some(business.clone());
                            true
                        }
                        None => {
                            found = false;
                            false
                        }
                    }
                });
                if !found {
                    tracing::debug!(%id, "ignoring selection of a business not in the filtered list");
                }
            }
            Command::ClearSelection => {
                self.state.send_if_modified(|state| state.selected.take().is_some());
            }
        }
    }

    /// Applies the latest typed query, optionally swapping in a new full list
    /// in the same update.
    fn recompute(&mut self, full_list: Option<Vec<Business>>) {
        let query = self.typed_query.clone();
        self.state.send_modify(|state| {
            if let Some(full_list) = full_list {
                state.full_list = full_list;
            }
            state.filtered_list = filter_businesses(&query, &state.full_list);
            state.query = query;
            state.revision += 1;
            let still_listed = state
                .selected
                .as_ref()
                .is_none_or(|selected| state.filtered_list.iter().any(|b| b.id == selected.id));
            if !still_listed {
                state.selected = None;
            }
        });
        tracing::trace!(
            query = %self.typed_query,
            matches = self.state.borrow().filtered_list.len(),
            "search filter recomputed"
        );
    }
}

async fn sleep_until_armed(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}
