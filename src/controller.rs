//! Interactive query input controller.
//!
//! The temporal heart of the crate: keystrokes debounce into engine
//! searches, Enter resolves the current text and navigates, and completions
//! arriving out of order are discarded by sequence number so the newest
//! issued operation always wins.
//!
//! Engine calls run as spawned tasks reporting back over a channel; the
//! owner of the controller (the TUI loop or a test harness) forwards each
//! received [`ControllerMsg`] into [`InputController::on_message`]. At most
//! one debounce timer is pending at any time - scheduling a new one aborts
//! the previous task, and a generation counter guards the abort race.
//! In-flight engine calls are never aborted, only discarded when stale.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::{QueryEngine, Resolution, SearchResults};
use crate::env::Locale;
use crate::navigate::Navigator;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(700);
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Status text shown while navigating to a resolved URL.
pub fn loading_status(url: &str) -> String {
    format!("Loading {url}")
}

/// Status text shown when resolution fails.
pub const NOT_FOUND_STATUS: &str = "not found / problem";

/// Controller tunables. Debounce, live search and the new-context submit are
/// toggles on one state machine, not forked controller variants.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub debounce: Duration,
    /// Minimum input length (in characters) before a live search is issued.
    pub min_query_len: usize,
    /// When off, keystrokes never trigger searches; submit still works.
    pub live_search: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            live_search: true,
        }
    }
}

/// One row of the rendered results list: display keyword, expected argument
/// names, and the shortcut title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRow {
    pub keyword: String,
    pub arguments: Vec<String>,
    pub title: String,
}

/// The three logical display regions the controller updates. The TUI renders
/// them; tests substitute a recorder.
pub trait Surface {
    /// Replace the whole results list (full redraw, no incremental patching).
    fn show_results(&mut self, rows: Vec<SuggestionRow>);
    fn clear_results(&mut self);
    fn set_status(&mut self, text: &str);
    fn clear_input(&mut self);
}

/// Completion messages reported back by spawned tasks.
#[derive(Debug)]
pub enum ControllerMsg {
    DebounceElapsed {
        generation: u64,
    },
    SearchDone {
        seq: u64,
        outcome: anyhow::Result<SearchResults>,
    },
    ProcessDone {
        seq: u64,
        query: String,
        new_context: bool,
        outcome: anyhow::Result<Resolution>,
    },
}

pub struct InputController<E> {
    engine: Arc<E>,
    locale: Locale,
    namespaces: Vec<String>,
    opts: ControllerOptions,
    current: String,
    previous: String,
    pending_debounce: Option<JoinHandle<()>>,
    debounce_generation: u64,
    /// Sequence number of the latest issued engine operation. Search and
    /// submit share the counter: a completion is applied only when it
    /// carries this exact number.
    seq: u64,
    results_shown: bool,
    tx: UnboundedSender<ControllerMsg>,
}

impl<E: QueryEngine> InputController<E> {
    pub fn new(
        engine: Arc<E>,
        locale: Locale,
        opts: ControllerOptions,
    ) -> (Self, UnboundedReceiver<ControllerMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let namespaces = locale.namespaces();
        let controller = Self {
            engine,
            locale,
            namespaces,
            opts,
            current: String::new(),
            previous: String::new(),
            pending_debounce: None,
            debounce_generation: 0,
            seq: 0,
            results_shown: false,
            tx,
        };
        (controller, rx)
    }

    /// Current input text as the controller knows it.
    pub fn input(&self) -> &str {
        &self.current
    }

    /// Handle a non-submitting input change. Unchanged text is a no-op;
    /// changed text below the length threshold clears the results; changed
    /// text at or above it schedules a fresh debounced search.
    pub fn handle_keystroke(&mut self, text: &str, surface: &mut dyn Surface) {
        if text == self.previous {
            self.current = text.to_string();
            return;
        }
        self.current = text.to_string();
        self.previous = self.current.clone();
        self.cancel_debounce();

        if !self.opts.live_search {
            return;
        }
        if self.current.chars().count() < self.opts.min_query_len {
            surface.clear_results();
            self.results_shown = false;
            return;
        }
        self.schedule_search();
    }

    /// Submit the current input. `new_context` is the modifier captured at
    /// submit time (a held Ctrl in the TUI).
    pub fn submit(&mut self, new_context: bool) {
        self.cancel_debounce();
        let query = self.current.clone();
        self.seq += 1;
        let seq = self.seq;
        let engine = Arc::clone(&self.engine);
        let tx = self.tx.clone();
        debug!(seq, query = query.as_str(), new_context, "process_start");
        tokio::spawn(async move {
            let outcome = engine.process(&query).await;
            let _ = tx.send(ControllerMsg::ProcessDone {
                seq,
                query,
                new_context,
                outcome,
            });
        });
    }

    /// Apply a completion message. Stale completions - older than the latest
    /// issued operation - are discarded.
    pub fn on_message(
        &mut self,
        msg: ControllerMsg,
        surface: &mut dyn Surface,
        navigator: &mut dyn Navigator,
    ) {
        match msg {
            ControllerMsg::DebounceElapsed { generation } => {
                if generation != self.debounce_generation {
                    // A superseded timer that lost the abort race.
                    return;
                }
                self.pending_debounce = None;
                self.issue_search(self.previous.clone());
            }
            ControllerMsg::SearchDone { seq, outcome } => {
                if seq != self.seq {
                    debug!(seq, latest = self.seq, "stale_search_discarded");
                    return;
                }
                match outcome {
                    Ok(results) => self.render_results(results, surface),
                    Err(error) => {
                        warn!(%error, "search_failed");
                        surface.set_status("?");
                    }
                }
            }
            ControllerMsg::ProcessDone {
                seq,
                query,
                new_context,
                outcome,
            } => {
                if seq != self.seq {
                    debug!(seq, latest = self.seq, "stale_resolution_discarded");
                    return;
                }
                self.finish_submit(query, new_context, outcome, surface, navigator);
            }
        }
    }

    fn cancel_debounce(&mut self) {
        self.debounce_generation += 1;
        if let Some(handle) = self.pending_debounce.take() {
            handle.abort();
        }
    }

    fn schedule_search(&mut self) {
        let generation = self.debounce_generation;
        let delay = self.opts.debounce;
        let tx = self.tx.clone();
        self.pending_debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ControllerMsg::DebounceElapsed { generation });
        }));
    }

    fn issue_search(&mut self, query: String) {
        self.seq += 1;
        let seq = self.seq;
        let engine = Arc::clone(&self.engine);
        let language = self.locale.language().to_string();
        let namespaces = self.namespaces.clone();
        let tx = self.tx.clone();
        debug!(seq, query = query.as_str(), "search_start");
        tokio::spawn(async move {
            let outcome = engine.search(&query, &language, &namespaces).await;
            let _ = tx.send(ControllerMsg::SearchDone { seq, outcome });
        });
    }

    fn render_results(&mut self, results: SearchResults, surface: &mut dyn Surface) {
        let rows: Vec<SuggestionRow> = results
            .iter()
            .map(|(key, entry)| {
                let keyword = key
                    .split_whitespace()
                    .next()
                    .unwrap_or(key.as_str())
                    .to_string();
                let arguments = entry
                    .url
                    .as_deref()
                    .map(|url| self.engine.placeholder_names(url))
                    .unwrap_or_default();
                SuggestionRow {
                    keyword,
                    arguments,
                    title: entry.title.clone(),
                }
            })
            .collect();
        self.results_shown = !rows.is_empty();
        surface.show_results(rows);
    }

    fn finish_submit(
        &mut self,
        query: String,
        new_context: bool,
        outcome: anyhow::Result<Resolution>,
        surface: &mut dyn Surface,
        navigator: &mut dyn Navigator,
    ) {
        match outcome {
            Ok(Resolution::Resolved { url: Some(url) }) => {
                if new_context {
                    navigator.open_new(&url);
                    self.current.clear();
                    self.previous.clear();
                    surface.clear_input();
                } else {
                    surface.set_status(&loading_status(&url));
                    navigator.replace(&url);
                }
            }
            Ok(Resolution::Resolved { url: None }) => {
                // Soft success: the engine resolved an informational shortcut
                // with no navigable target.
                debug!(query = query.as_str(), "resolved_without_target");
            }
            Ok(Resolution::NotFound { reason }) => self.fail_submit(&query, &reason, surface),
            Err(error) => self.fail_submit(&query, &error.to_string(), surface),
        }
    }

    fn fail_submit(&mut self, query: &str, reason: &str, surface: &mut dyn Surface) {
        warn!(query, reason, "resolution_failed");
        surface.set_status(NOT_FOUND_STATUS);
        if !self.results_shown {
            // Fallback: show candidate matches instead of a dead end.
            self.issue_search(query.to_string());
        }
    }
}
