//! onelink TUI
//!
//! Terminal user interface for onelink - link collections with previews.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Collections with link counts (active one marked)
//! - Right: Links in the active collection, or an empty-state message
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - h/l or ←/→: Switch focus between panes
//! - Tab: Switch panes
//! - Enter: Select collection / Open link in browser
//! - q: Quit
//!
//! ## Commands
//!
//! - n: New collection
//! - r: Rename active collection
//! - d: Delete active collection (asks first)
//! - a: Add link (`<url> [title]`)
//! - x: Export active collection as HTML
//!
//! Previews are fetched on detached tasks and arrive over a channel, so
//! adding a link never blocks the interface.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use onelink_core::{Config, PreviewClient, PreviewCompletion, Store};

use app::{App, InputMode, InputResult};

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if ONELINK_LOG is set)
    init_tui_logging(&config);

    let mut store = Store::open_with_config(config).context("Failed to open store")?;
    let previews =
        PreviewClient::from_config(store.config()).context("Invalid preview configuration")?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(&store);

    let result = run_app(&mut terminal, &mut app, &mut store, &previews).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut Store,
    previews: &PreviewClient,
) -> Result<()> {
    let (preview_tx, mut preview_rx) = mpsc::unbounded_channel::<PreviewCompletion>();

    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        let delete_target = app.delete_target(store).map(str::to_string);
        terminal.draw(|frame| ui::draw(frame, app, delete_target.as_deref()))?;

        tokio::select! {
            biased;

            // Finished previews
            Some(completion) = preview_rx.recv() => {
                debug!("Preview finished for {}", completion.link_id);
                if let Err(e) = app.apply_preview(store, completion) {
                    app.set_failure(format!("Failed to save preview: {}", e), &e);
                }
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                // Check for terminal events (non-blocking)
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If error modal is showing, any key dismisses it
                        if app.has_error() {
                            app.clear_error();
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        match app.input_mode {
                            InputMode::Normal => {
                                handle_normal_mode(app, store, key.code, key.modifiers);
                            }
                            InputMode::ConfirmDelete => {
                                handle_confirm_mode(app, store, key.code);
                            }
                            InputMode::NewCollection | InputMode::Rename | InputMode::AddLink => {
                                if let Some(link) = handle_input_mode(app, store, key.code, key.modifiers) {
                                    previews.spawn(&link, preview_tx.clone());
                                    app.pending_previews += 1;
                                }
                            }
                        }
                    }
                }
            }
        }

        if app.should_quit {
            if app.pending_previews > 0 {
                info!("Quitting with {} preview(s) in flight", app.pending_previews);
            }
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode(app: &mut App, store: &mut Store, code: KeyCode, modifiers: KeyModifiers) {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('h')
            | KeyCode::Char('l')
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
    ) {
        app.status_message = None;
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        // Two panes, so every direction just switches
        KeyCode::Char('h')
        | KeyCode::Left
        | KeyCode::Char('l')
        | KeyCode::Right
        | KeyCode::Tab
        | KeyCode::BackTab => app.switch_pane(),

        KeyCode::Enter => {
            if let Err(e) = app.handle_enter(store) {
                app.set_failure(format!("Action failed: {}", e), &e);
            }
        }

        KeyCode::Char('n') => app.enter_input_mode(InputMode::NewCollection, store),
        KeyCode::Char('r') => app.enter_input_mode(InputMode::Rename, store),
        KeyCode::Char('a') => app.enter_input_mode(InputMode::AddLink, store),
        KeyCode::Char('d') => app.request_delete(store),
        KeyCode::Char('x') => {
            if let Err(e) = app.export_active(store) {
                app.set_failure(format!("Export failed: {}", e), &e);
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle the y/n answer for a pending delete
fn handle_confirm_mode(app: &mut App, store: &mut Store, code: KeyCode) {
    let confirmed = matches!(code, KeyCode::Char('y') | KeyCode::Char('Y'));
    if let Err(e) = app.confirm_delete(store, confirmed) {
        app.set_failure(format!("Failed to delete collection: {}", e), &e);
    }
}

/// Handle key events while typing
///
/// Returns a newly added link that still needs its preview.
fn handle_input_mode(
    app: &mut App,
    store: &mut Store,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<onelink_core::Link> {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.exit_input_mode();
        }

        KeyCode::Enter => match app.submit_input(store) {
            Ok(InputResult::LinkAdded(link)) => return Some(link),
            Ok(InputResult::Done) => {}
            Err(e) => app.set_failure(e.to_string(), &e),
        },

        // Text input
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),

        _ => {}
    }

    None
}

/// Initialize logging for TUI mode
///
/// Only initializes if ONELINK_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(crate::LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(crate::log_filter(&log_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
