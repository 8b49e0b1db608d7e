//! Interactive terminal front-end.
//!
//! Renders the three display regions - input field, status line, results
//! list - and feeds key events into the controller. A blocking thread reads
//! crossterm events into a channel; the main loop selects over key events
//! and controller completions.
//!
//! Keys: type to search, Enter opens, Ctrl+Enter opens in a new context,
//! Esc or Ctrl+C quits.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::controller::{ControllerOptions, InputController, SuggestionRow, Surface};
use crate::engine::QueryEngine;
use crate::env::Locale;
use crate::navigate::SystemNavigator;

const HELP_STATUS: &str = "type to search - Enter opens, Ctrl+Enter opens a new context, Esc quits";

/// Mutable render state for the three display regions.
#[derive(Debug, Default)]
pub struct ViewState {
    pub input: String,
    pub status: String,
    pub rows: Vec<SuggestionRow>,
}

impl Surface for ViewState {
    fn show_results(&mut self, rows: Vec<SuggestionRow>) {
        self.rows = rows;
    }

    fn clear_results(&mut self) {
        self.rows.clear();
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }
}

/// Display label for one suggestion row: the keyword plus its expected
/// argument names, e.g. `w <query>`.
pub fn suggestion_label(row: &SuggestionRow) -> String {
    if row.arguments.is_empty() {
        row.keyword.clone()
    } else {
        format!("{} <{}>", row.keyword, row.arguments.join(", "))
    }
}

pub async fn run_tui<E: QueryEngine>(
    engine: Arc<E>,
    locale: Locale,
    opts: ControllerOptions,
    initial_query: Option<String>,
) -> Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let result = event_loop(engine, locale, opts, initial_query).await;
    io::stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

async fn event_loop<E: QueryEngine>(
    engine: Arc<E>,
    locale: Locale,
    opts: ControllerOptions,
    initial_query: Option<String>,
) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (mut controller, mut engine_rx) = InputController::new(engine, locale, opts);
    let mut view = ViewState {
        status: HELP_STATUS.to_string(),
        ..ViewState::default()
    };
    let mut navigator = SystemNavigator;

    if let Some(query) = initial_query {
        view.input = query.clone();
        controller.handle_keystroke(&query, &mut view);
    }

    let mut input_rx = spawn_input_reader();

    loop {
        terminal.draw(|frame| draw(frame, &view))?;
        tokio::select! {
            Some(msg) = engine_rx.recv() => {
                controller.on_message(msg, &mut view, &mut navigator);
            }
            Some(ev) = input_rx.recv() => {
                if !handle_event(ev, &mut controller, &mut view) {
                    break;
                }
            }
            else => break,
        }
    }

    Ok(())
}

/// Blocking crossterm reader feeding the async loop.
fn spawn_input_reader() -> UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

/// Returns false when the loop should exit.
fn handle_event<E: QueryEngine>(
    ev: Event,
    controller: &mut InputController<E>,
    view: &mut ViewState,
) -> bool {
    let Event::Key(key) = ev else {
        return true;
    };
    if key.kind != KeyEventKind::Press {
        return true;
    }

    match key.code {
        KeyCode::Esc => return false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Enter => {
            controller.submit(key.modifiers.contains(KeyModifiers::CONTROL));
        }
        KeyCode::Backspace => {
            view.input.pop();
            let text = view.input.clone();
            controller.handle_keystroke(&text, view);
        }
        KeyCode::Char(c) => {
            view.input.push(c);
            let text = view.input.clone();
            controller.handle_keystroke(&text, view);
        }
        _ => {}
    }
    true
}

fn draw(frame: &mut ratatui::Frame, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // input field
            Constraint::Length(1), // status line
            Constraint::Min(0),    // results list
        ])
        .split(frame.area());

    let input = Paragraph::new(view.input.as_str())
        .block(Block::default().borders(Borders::ALL).title("query"));
    frame.render_widget(input, chunks[0]);
    frame.set_cursor_position(Position::new(
        chunks[0].x + 1 + view.input.chars().count() as u16,
        chunks[0].y + 1,
    ));

    let status = Paragraph::new(view.status.as_str()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, chunks[1]);

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    suggestion_label(row),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(row.title.clone()),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("suggestions"));
    frame.render_widget(list, chunks[2]);
}
