//! Application state and logic

use std::time::{Duration, Instant};

use onelink_core::preview::PreviewCompletion;
use onelink_core::view::{self, CollectionSummary, LinkCard, LinkGrid};
use onelink_core::{ApplyOutcome, ExportDocument, Link, Store};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing the name of a new collection
    NewCollection,
    /// Typing a new name for the active collection
    Rename,
    /// Typing `<url> [title]`
    AddLink,
    /// Waiting for y/n before deleting the active collection
    ConfirmDelete,
}

impl InputMode {
    /// Whether this mode edits the input line
    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            InputMode::NewCollection | InputMode::Rename | InputMode::AddLink
        )
    }

    /// Prompt shown before the input line
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::NewCollection => "New collection: ",
            InputMode::Rename => "Rename collection: ",
            InputMode::AddLink => "Add link (<url> [title]): ",
            InputMode::Normal | InputMode::ConfirmDelete => "",
        }
    }
}

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Collections,
    Links,
}

impl ActivePane {
    /// Move to the other pane
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Collections => ActivePane::Links,
            ActivePane::Links => ActivePane::Collections,
        }
    }
}

/// Result of submitting the input line
#[derive(Debug)]
pub enum InputResult {
    /// Nothing further to do
    Done,
    /// A link was added and needs its preview fetched
    LinkAdded(Link),
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Input line buffer
    pub input: String,
    /// Cursor position in the input line, in characters
    pub input_cursor: usize,
    /// Which pane has focus
    pub active_pane: ActivePane,
    /// Collection list, in stored order
    pub collections: Vec<CollectionSummary>,
    /// Selected row in the collection list
    pub collection_index: usize,
    /// Contents of the link pane
    pub grid: LinkGrid,
    /// Heading above the link pane
    pub heading: String,
    /// Selected row in the link pane
    pub link_index: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Number of preview requests still in flight
    pub pending_previews: usize,
}

impl App {
    /// Create a new app with data from store
    pub fn new(store: &Store) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            input: String::new(),
            input_cursor: 0,
            active_pane: ActivePane::Links,
            collections: Vec::new(),
            collection_index: 0,
            grid: LinkGrid::NoCollection,
            heading: String::new(),
            link_index: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            pending_previews: 0,
        };
        app.refresh(store);
        if store.active().is_none() {
            app.active_pane = ActivePane::Collections;
        }
        app
    }

    /// Rebuild display data from the store
    pub fn refresh(&mut self, store: &Store) {
        self.collections = view::collection_list(store.state());
        self.grid = LinkGrid::for_state(store.state());
        self.heading = view::heading(store.state()).to_string();

        if let Some(pos) = self.collections.iter().position(|c| c.active) {
            self.collection_index = pos;
        } else {
            self.collection_index = self
                .collection_index
                .min(self.collections.len().saturating_sub(1));
        }
        self.link_index = self
            .link_index
            .min(self.grid.cards().len().saturating_sub(1));
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Show a failed action, with a recovery hint when there is one
    pub fn set_failure(&mut self, message: String, err: &anyhow::Error) {
        let message = match crate::recovery_hint(err) {
            Some(hint) => format!("{}\n\n{}", message, hint),
            None => message,
        };
        self.set_error(message);
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Get the currently selected link card
    pub fn current_card(&self) -> Option<&LinkCard> {
        self.grid.cards().get(self.link_index)
    }

    /// Move selection up in the current pane
    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Collections => {
                self.collection_index = self.collection_index.saturating_sub(1);
            }
            ActivePane::Links => {
                self.link_index = self.link_index.saturating_sub(1);
            }
        }
    }

    /// Move selection down in the current pane
    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Collections => {
                if self.collection_index < self.collections.len().saturating_sub(1) {
                    self.collection_index += 1;
                }
            }
            ActivePane::Links => {
                if self.link_index < self.grid.cards().len().saturating_sub(1) {
                    self.link_index += 1;
                }
            }
        }
    }

    /// Switch focus to the other pane
    pub fn switch_pane(&mut self) {
        self.active_pane = self.active_pane.toggle();
    }

    /// Handle Enter key in current pane
    pub fn handle_enter(&mut self, store: &mut Store) -> anyhow::Result<()> {
        match self.active_pane {
            ActivePane::Collections => {
                let Some(summary) = self.collections.get(self.collection_index) else {
                    return Ok(());
                };
                let id = summary.id;
                if store.set_active(id)? {
                    self.link_index = 0;
                    self.refresh(store);
                    self.active_pane = ActivePane::Links;
                }
            }
            ActivePane::Links => {
                if let Some(card) = self.current_card() {
                    let url = card.url.clone();
                    let title = card.title.clone();
                    match open::that_detached(&url) {
                        Ok(()) => self.set_status(format!("Opened '{}'", title)),
                        Err(e) => self.set_status(format!("Failed to open: {}", e)),
                    }
                }
            }
        }
        Ok(())
    }

    /// Start typing in one of the input modes
    pub fn enter_input_mode(&mut self, mode: InputMode, store: &Store) {
        if matches!(mode, InputMode::Rename | InputMode::AddLink) && store.active().is_none() {
            self.set_error(view::NO_COLLECTION_MESSAGE);
            return;
        }

        self.input_mode = mode;
        self.input.clear();
        self.input_cursor = 0;

        if mode == InputMode::Rename {
            if let Some(active) = store.active() {
                self.input = active.name.clone();
                self.input_cursor = self.input.chars().count();
            }
        }
    }

    /// Return to normal mode, discarding input
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.input_cursor = 0;
    }

    /// Ask for confirmation before deleting the active collection
    pub fn request_delete(&mut self, store: &Store) {
        if store.active().is_some() {
            self.input_mode = InputMode::ConfirmDelete;
        } else {
            self.set_status("No collection selected");
        }
    }

    /// Resolve the delete confirmation
    pub fn confirm_delete(&mut self, store: &mut Store, confirmed: bool) -> anyhow::Result<()> {
        self.input_mode = InputMode::Normal;

        match store.delete_active(|_| confirmed)? {
            Some(removed) => {
                self.set_status(format!("Deleted '{}'", removed.name));
                self.link_index = 0;
                self.refresh(store);
            }
            None => self.set_status("Delete cancelled"),
        }
        Ok(())
    }

    /// Name of the collection a pending delete would remove
    pub fn delete_target<'a>(&self, store: &'a Store) -> Option<&'a str> {
        store.active().map(|c| c.name.as_str())
    }

    /// Submit the input line for the current mode
    pub fn submit_input(&mut self, store: &mut Store) -> anyhow::Result<InputResult> {
        let mode = self.input_mode;
        let input = self.input.trim().to_string();
        self.exit_input_mode();

        match mode {
            InputMode::NewCollection => {
                if input.is_empty() {
                    return Ok(InputResult::Done);
                }
                store.create_collection(&input)?;
                self.link_index = 0;
                self.refresh(store);
                self.set_status(format!("Created '{}'", input));
            }
            InputMode::Rename => {
                if store.rename_active(&input)? {
                    self.refresh(store);
                    self.set_status(format!("Renamed to '{}'", input));
                }
            }
            InputMode::AddLink => {
                let (url, title) = split_link_input(&input);
                let link = store.add_link_to_active(url, title)?;
                self.link_index = 0;
                self.refresh(store);
                self.set_status(format!("Added '{}'", link.title));
                return Ok(InputResult::LinkAdded(link));
            }
            InputMode::Normal | InputMode::ConfirmDelete => {}
        }

        Ok(InputResult::Done)
    }

    /// Apply a finished preview and refresh the link pane
    pub fn apply_preview(
        &mut self,
        store: &mut Store,
        completion: PreviewCompletion,
    ) -> anyhow::Result<()> {
        self.pending_previews = self.pending_previews.saturating_sub(1);
        let outcome = store.apply_preview(completion.link_id, &completion.outcome)?;
        if outcome == ApplyOutcome::Applied {
            if completion.outcome.is_fallback() {
                self.set_status("Preview unavailable, showing site icon");
            }
            self.refresh(store);
        }
        Ok(())
    }

    /// Export the active collection to the configured directory
    pub fn export_active(&mut self, store: &Store) -> anyhow::Result<()> {
        let Some(collection) = store.active() else {
            self.set_status("No collection selected");
            return Ok(());
        };

        let document = ExportDocument::from_collection(collection);
        let path = document.write_to(&store.config().export_path())?;
        self.set_status(format!("Exported to {}", path.display()));
        Ok(())
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = byte_offset(&self.input, self.input_cursor);
        self.input.insert(at, c);
        self.input_cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let at = byte_offset(&self.input, self.input_cursor);
            self.input.remove(at);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            self.input_cursor += 1;
        }
    }
}

/// Split `<url> [title]` into its parts
pub fn split_link_input(input: &str) -> (&str, Option<&str>) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((url, title)) => {
            let title = title.trim();
            (url, (!title.is_empty()).then_some(title))
        }
        None => (input, None),
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
