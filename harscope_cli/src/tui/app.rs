//! TUI application state and event handling

use crate::config::Preferences;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use harscope_core::debounce::Debouncer;
use harscope_core::{
    FilterType, HarEntry, ImportError, ImportOutcome, ImportSource, ImportTicket, SortDirection,
    SortKey, Timeline, TraceStore, Virtualizer,
};
use ratatui::layout::{Position, Rect};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a status line message stays up
pub const STATUS_TTL: Duration = Duration::from_secs(5);

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: i64 = 3;

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Filter,
    ImportPrompt,
}

/// Detail pane tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Headers,
    Payload,
    Response,
    Cookies,
    Timing,
    Curl,
}

impl DetailTab {
    pub const ALL: [DetailTab; 6] = [
        DetailTab::Headers,
        DetailTab::Payload,
        DetailTab::Response,
        DetailTab::Cookies,
        DetailTab::Timing,
        DetailTab::Curl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Headers => "Headers",
            DetailTab::Payload => "Payload",
            DetailTab::Response => "Response",
            DetailTab::Cookies => "Cookies",
            DetailTab::Timing => "Timing",
            DetailTab::Curl => "cURL",
        }
    }

    fn step(&self, forward: bool) -> Self {
        let pos = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        let len = Self::ALL.len();
        let next = if forward { pos + 1 } else { pos + len - 1 };
        Self::ALL[next % len]
    }
}

/// Transient message shown in the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

/// Side effects the event loop runs on behalf of the app
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Import {
        ticket: ImportTicket,
        source: ImportSource,
        path: PathBuf,
    },
    SavePreferences,
}

/// Events that can be sent to the TUI
#[derive(Debug)]
pub enum TuiEvent {
    /// Input from the terminal (keys, mouse, paste, resize)
    Terminal(Event),
    /// Entries received by the capture listener
    Captured(Vec<HarEntry>),
    /// Capture client asked to clear the trace
    CaptureCleared,
    /// A background import completed
    ImportFinished {
        ticket: ImportTicket,
        path: PathBuf,
        result: Result<Vec<HarEntry>, ImportError>,
    },
    /// Tick for periodic updates
    Tick,
}

/// Screen areas from the last draw, used to route mouse events
#[derive(Debug, Clone, Default)]
pub struct Regions {
    pub chips: Vec<(FilterType, Rect)>,
    pub timeline: Rect,
    pub table_header: Vec<(SortKey, Rect)>,
    pub table_body: Rect,
    pub detail: Rect,
    pub detail_tabs: Vec<(DetailTab, Rect)>,
}

/// TUI application state
pub struct TuiApp {
    pub store: TraceStore,
    pub virtualizer: Virtualizer,
    pub timeline: Timeline,
    pub prefs: Preferences,
    pub focus: Focus,
    /// Filter box contents; reaches the store after the debounce delay
    pub filter_input: String,
    pub import_input: String,
    pub detail_tab: DetailTab,
    pub detail_scroll: u16,
    pub status: Option<StatusMessage>,
    pub regions: Regions,
    pub listen_addr: Option<SocketAddr>,
    pub should_quit: bool,
    filter_debounce: Debouncer<String>,
    commands: Vec<Command>,
}

impl TuiApp {
    pub fn new(store: TraceStore, prefs: Preferences) -> Self {
        let filter_input = store.filter().text.clone();
        Self {
            virtualizer: Virtualizer::new(prefs.row_size()),
            timeline: Timeline::new(),
            store,
            prefs,
            focus: Focus::Table,
            filter_input,
            import_input: String::new(),
            detail_tab: DetailTab::Headers,
            detail_scroll: 0,
            status: None,
            regions: Regions::default(),
            listen_addr: None,
            should_quit: false,
            filter_debounce: Debouncer::default(),
            commands: Vec::new(),
        }
    }

    /// Drain side effects queued by the last events
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn filter_pending(&self) -> bool {
        self.filter_debounce.is_pending()
    }

    /// Show a message in the status line
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
            expires_at: now + STATUS_TTL,
        });
    }

    /// Start importing `path`
    pub fn start_import(&mut self, source: ImportSource, path: PathBuf) {
        let ticket = self.store.begin_import();
        tracing::info!("Importing {}", path.display());
        self.commands.push(Command::Import {
            ticket,
            source,
            path,
        });
    }

    /// Handle TUI event
    pub fn handle_event(&mut self, event: TuiEvent, now: Instant) {
        match event {
            TuiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, now)
            }
            TuiEvent::Terminal(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            TuiEvent::Terminal(Event::Paste(text)) => self.handle_paste(&text, now),
            TuiEvent::Terminal(_) => {} // Resize and focus changes just redraw
            TuiEvent::Captured(entries) => self.add_captured(entries),
            TuiEvent::CaptureCleared => self.clear_trace(),
            TuiEvent::ImportFinished {
                ticket,
                path,
                result,
            } => self.finish_import(ticket, path, result, now),
            TuiEvent::Tick => self.tick(now),
        }
    }

    /// Periodic housekeeping: apply a quiet filter, expire the status line
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.filter_debounce.poll(now) {
            self.apply_filter(text);
        }
        if self.status.as_ref().is_some_and(|s| now >= s.expires_at) {
            self.status = None;
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        // Any key dismisses an error
        if self.status.as_ref().is_some_and(|s| s.is_error) {
            self.status = None;
        }

        match self.focus {
            Focus::Table => self.handle_table_key(key, now),
            Focus::Filter => self.handle_filter_key(key, now),
            Focus::ImportPrompt => self.handle_prompt_key(key),
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent, now: Instant) {
        match (key.code, key.modifiers) {
            // Quit
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
            }
            (KeyCode::Char('f'), KeyModifiers::CONTROL) | (KeyCode::Char('/'), _) => {
                self.focus = Focus::Filter;
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                self.store.toggle_recording();
                let text = if self.store.is_recording() {
                    "Recording resumed"
                } else {
                    "Recording paused"
                };
                self.set_status(text, false, now);
            }
            (KeyCode::Char('o'), KeyModifiers::CONTROL) => {
                self.import_input.clear();
                self.focus = Focus::ImportPrompt;
            }
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
                self.clear_trace();
            }
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
                self.prefs.show_filters = !self.prefs.show_filters;
                self.commands.push(Command::SavePreferences);
            }
            (KeyCode::Esc, _) => {
                self.store.select(None);
            }
            // Selection
            (KeyCode::Up | KeyCode::Char('k'), _) => {
                self.store.select_previous();
                self.reveal_selection();
            }
            (KeyCode::Down | KeyCode::Char('j'), _) => {
                self.store.select_next();
                self.reveal_selection();
            }
            (KeyCode::Home, _) => {
                self.store.select_view_index(0);
                self.reveal_selection();
            }
            (KeyCode::End, _) => {
                self.store
                    .select_view_index(self.store.view_len().saturating_sub(1));
                self.reveal_selection();
            }
            // Scrolling
            (KeyCode::PageUp, _) => {
                let page = self.virtualizer.viewport_height() as i64;
                self.virtualizer.scroll_by(-page, self.store.view_len());
            }
            (KeyCode::PageDown, _) => {
                let page = self.virtualizer.viewport_height() as i64;
                self.virtualizer.scroll_by(page, self.store.view_len());
            }
            // Criteria
            (KeyCode::F(n), _) if (1..=FilterType::ALL.len() as u8).contains(&n) => {
                self.store.toggle_category(FilterType::ALL[n as usize - 1]);
            }
            (KeyCode::Char('i'), _) => {
                let invert = !self.store.filter().invert;
                self.store.set_invert(invert);
            }
            (KeyCode::Char('s'), _) => {
                let sort = self.store.sort();
                self.store.set_sort(sort.key.next(), sort.direction);
            }
            (KeyCode::Char('S'), _) => {
                let sort = self.store.sort();
                self.store.set_sort(sort.key, sort.direction.toggle());
            }
            // Layout
            (KeyCode::Char('b'), _) => {
                self.prefs.big_rows = !self.prefs.big_rows;
                self.virtualizer.set_row_size(self.prefs.row_size());
                self.commands.push(Command::SavePreferences);
            }
            (KeyCode::Char('v'), _) => {
                self.prefs.show_overview = !self.prefs.show_overview;
                self.commands.push(Command::SavePreferences);
            }
            (KeyCode::Char('d'), _) => {
                self.store.toggle_detail();
            }
            (KeyCode::Char('+') | KeyCode::Char('='), _) => {
                self.resize_detail(2);
            }
            (KeyCode::Char('-'), _) => {
                self.resize_detail(-2);
            }
            (KeyCode::Tab, _) if self.store.detail_open() => {
                self.set_detail_tab(self.detail_tab.step(true));
            }
            (KeyCode::BackTab, _) if self.store.detail_open() => {
                self.set_detail_tab(self.detail_tab.step(false));
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent, now: Instant) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.filter_input.clear();
                self.filter_debounce.push(self.filter_input.clone(), now);
            }
            (KeyCode::Esc | KeyCode::Enter, _) => {
                if let Some(text) = self.filter_debounce.flush() {
                    self.apply_filter(text);
                }
                self.focus = Focus::Table;
            }
            (KeyCode::Backspace, _) => {
                self.filter_input.pop();
                self.filter_debounce.push(self.filter_input.clone(), now);
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.filter_input.push(c);
                self.filter_debounce.push(self.filter_input.clone(), now);
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Esc, _) => {
                self.focus = Focus::Table;
            }
            (KeyCode::Enter, _) => {
                let path = self.import_input.trim().to_string();
                self.focus = Focus::Table;
                if !path.is_empty() {
                    self.start_import(ImportSource::Picker, expand_home(&path));
                }
            }
            (KeyCode::Backspace, _) => {
                self.import_input.pop();
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.import_input.push(c);
            }
            _ => {}
        }
    }

    /// Bracketed paste: text for the focused input, or a file dropped on
    /// the terminal
    pub fn handle_paste(&mut self, text: &str, now: Instant) {
        match self.focus {
            Focus::Filter => {
                self.filter_input.push_str(text.trim());
                self.filter_debounce.push(self.filter_input.clone(), now);
            }
            Focus::ImportPrompt => {
                self.import_input.push_str(text.trim());
            }
            Focus::Table => match dropped_path(text) {
                Some(path) => self.start_import(ImportSource::Drop, path),
                None => tracing::debug!("Ignoring empty paste"),
            },
        }
    }

    /// Handle mouse events
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(at),
            MouseEventKind::ScrollDown => self.wheel(at, 1),
            MouseEventKind::ScrollUp => self.wheel(at, -1),
            _ => {}
        }
    }

    fn click(&mut self, at: Position) {
        let chip = self.regions.chips.iter().find(|(_, r)| r.contains(at)).map(|(t, _)| *t);
        let header = self
            .regions
            .table_header
            .iter()
            .find(|(_, r)| r.contains(at))
            .map(|(k, _)| *k);
        let tab = self
            .regions
            .detail_tabs
            .iter()
            .find(|(_, r)| r.contains(at))
            .map(|(t, _)| *t);

        if let Some(filter_type) = chip {
            self.store.toggle_category(filter_type);
        } else if self.regions.timeline.contains(at) {
            // Cell centers, in timeline-local coordinates
            let area = self.regions.timeline;
            let x = (at.x - area.x) as f64 + 0.5;
            let y = (at.y - area.y) as f64 + 0.5;
            if self.timeline.select_at(&mut self.store, x, y).is_some() {
                self.reveal_selection();
            }
        } else if let Some(key) = header {
            let sort = self.store.sort();
            let direction = if sort.key == key {
                sort.direction.toggle()
            } else {
                SortDirection::Ascending
            };
            self.store.set_sort(key, direction);
        } else if self.regions.table_body.contains(at) {
            let offset = (at.y - self.regions.table_body.y) as u32;
            if let Some(index) = self.virtualizer.index_at(offset, self.store.view_len()) {
                self.store.select_view_index(index);
                self.detail_scroll = 0;
            }
        } else if let Some(tab) = tab {
            self.set_detail_tab(tab);
        }
    }

    fn wheel(&mut self, at: Position, direction: i64) {
        if self.regions.detail.contains(at) {
            self.detail_scroll = if direction > 0 {
                self.detail_scroll.saturating_add(WHEEL_ROWS as u16)
            } else {
                self.detail_scroll.saturating_sub(WHEEL_ROWS as u16)
            };
        } else {
            let delta = direction * WHEEL_ROWS * self.virtualizer.row_height() as i64;
            self.virtualizer.scroll_by(delta, self.store.view_len());
        }
    }

    fn add_captured(&mut self, entries: Vec<HarEntry>) {
        let received = entries.len();
        let kept = self.store.append_entries(entries);
        if kept < received {
            tracing::debug!("Dropped {} captured entries while paused", received - kept);
        }
    }

    fn clear_trace(&mut self) {
        self.store.clear();
        self.virtualizer.scroll_to(0, 0);
        self.detail_scroll = 0;
    }

    fn finish_import(
        &mut self,
        ticket: ImportTicket,
        path: PathBuf,
        result: Result<Vec<HarEntry>, ImportError>,
        now: Instant,
    ) {
        match result {
            Ok(records) => match self.store.finish_import(ticket, records) {
                ImportOutcome::Applied(count) => {
                    self.virtualizer.scroll_to(0, self.store.view_len());
                    self.detail_scroll = 0;
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                    let text = format!(
                        "Loaded {} entries from {}",
                        count,
                        name.unwrap_or_else(|| path.display().to_string())
                    );
                    self.set_status(text, false, now);
                }
                ImportOutcome::Stale => {
                    tracing::debug!("Import of {} was superseded", path.display());
                }
            },
            Err(e) => {
                tracing::warn!("Import of {} failed: {}", path.display(), e);
                if self.store.fail_import(ticket) {
                    self.set_status(e.to_string(), true, now);
                }
            }
        }
    }

    fn apply_filter(&mut self, text: String) {
        if text != self.store.filter().text {
            self.store.set_filter_text(text);
        }
    }

    fn set_detail_tab(&mut self, tab: DetailTab) {
        self.detail_tab = tab;
        self.detail_scroll = 0;
    }

    fn resize_detail(&mut self, delta: i16) {
        self.prefs.resize_detail(delta);
        self.commands.push(Command::SavePreferences);
    }

    /// Scroll the table so the selected row is on screen
    fn reveal_selection(&mut self) {
        self.detail_scroll = 0;
        if let Some(index) = self.store.selected_view_index() {
            self.virtualizer
                .scroll_to_index(index, self.store.view_len());
        }
    }
}

/// Path of a file dropped on the terminal. Terminals paste it quoted or
/// backslash-escaped, sometimes as a `file://` URL.
fn dropped_path(text: &str) -> Option<PathBuf> {
    let text = text.trim();
    let text = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(text);
    let text = text.strip_prefix("file://").unwrap_or(text);
    let text = text.replace("\\ ", " ");
    (!text.is_empty()).then(|| expand_home(&text))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use harscope_core::generator::generate_entries;
    use harscope_core::RowSize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entries(count: usize) -> Vec<HarEntry> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        generate_entries(count, base, &mut StdRng::seed_from_u64(42))
    }

    fn app_with(count: usize) -> TuiApp {
        let mut store = TraceStore::new();
        store.set_entries(entries(count));
        let mut app = TuiApp::new(store, Preferences::default());
        app.virtualizer.set_viewport_height(10);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn type_text(app: &mut TuiApp, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
    }

    #[test]
    fn test_filter_applies_after_quiet_period() {
        let mut app = app_with(50);
        let t0 = Instant::now();

        app.handle_key(ctrl('f'), t0);
        assert_eq!(app.focus, Focus::Filter);
        type_text(&mut app, "api", t0);
        assert_eq!(app.filter_input, "api");

        let revision = app.store.revision();
        app.tick(t0 + Duration::from_millis(100));
        assert_eq!(app.store.filter().text, "");
        assert_eq!(app.store.revision(), revision);

        app.tick(t0 + Duration::from_millis(150));
        assert_eq!(app.store.filter().text, "api");
        assert!(app.store.view().all(|e| e.url().contains("api")));
    }

    #[test]
    fn test_enter_applies_filter_immediately() {
        let mut app = app_with(20);
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), t0);
        type_text(&mut app, "cdn", t0);
        app.handle_key(key(KeyCode::Enter), t0);

        assert_eq!(app.focus, Focus::Table);
        assert_eq!(app.store.filter().text, "cdn");
        assert!(!app.filter_pending());
    }

    #[test]
    fn test_navigation_opens_and_escape_closes_detail() {
        let mut app = app_with(5);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Down), now);
        assert_eq!(app.store.selected_view_index(), Some(0));
        assert!(app.store.detail_open());

        app.handle_key(key(KeyCode::Char('j')), now);
        assert_eq!(app.store.selected_view_index(), Some(1));

        app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(app.store.selected(), None);
        assert!(!app.store.detail_open());
    }

    #[test]
    fn test_selection_is_scrolled_into_view() {
        let mut app = app_with(100);
        let now = Instant::now();
        app.handle_key(key(KeyCode::End), now);
        assert_eq!(app.store.selected_view_index(), Some(99));
        assert_eq!(app.virtualizer.scroll_offset(), 90);
    }

    #[test]
    fn test_function_keys_toggle_categories() {
        let mut app = app_with(50);
        let now = Instant::now();
        app.handle_key(key(KeyCode::F(2)), now);
        assert!(app.store.filter().types.contains(FilterType::Xhr));
        assert!(app.store.view().all(|e| FilterType::Xhr.accepts(e.resource_type())));

        app.handle_key(key(KeyCode::F(1)), now);
        assert!(app.store.filter().types.is_all());
        assert_eq!(app.store.view_len(), 50);
    }

    #[test]
    fn test_sort_keys() {
        let mut app = app_with(10);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('s')), now);
        assert_eq!(app.store.sort().key, SortKey::Name);
        app.handle_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT), now);
        assert_eq!(app.store.sort().direction, SortDirection::Descending);
    }

    #[test]
    fn test_import_prompt_queues_import() {
        let mut app = app_with(0);
        let now = Instant::now();
        app.handle_key(ctrl('o'), now);
        assert_eq!(app.focus, Focus::ImportPrompt);
        type_text(&mut app, "trace.har", now);
        app.handle_key(key(KeyCode::Enter), now);

        assert_eq!(app.focus, Focus::Table);
        assert!(app.store.import_pending());
        match app.take_commands().as_slice() {
            [Command::Import { source, path, .. }] => {
                assert_eq!(*source, ImportSource::Picker);
                assert_eq!(path, &PathBuf::from("trace.har"));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_paste_on_table_is_a_drop() {
        let mut app = app_with(0);
        app.handle_paste("'/tmp/my trace.har'\n", Instant::now());
        match app.take_commands().as_slice() {
            [Command::Import { source, path, .. }] => {
                assert_eq!(*source, ImportSource::Drop);
                assert_eq!(path, &PathBuf::from("/tmp/my trace.har"));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_dropped_path_unescaping() {
        assert_eq!(dropped_path("/a/b\\ c.har"), Some(PathBuf::from("/a/b c.har")));
        assert_eq!(dropped_path("file:///a/b.har"), Some(PathBuf::from("/a/b.har")));
        assert_eq!(dropped_path("\"/a/b.har\""), Some(PathBuf::from("/a/b.har")));
        assert_eq!(dropped_path("   "), None);
    }

    #[test]
    fn test_import_result_replaces_trace() {
        let mut app = app_with(3);
        let now = Instant::now();
        app.start_import(ImportSource::Picker, PathBuf::from("big.har"));
        let ticket = match app.take_commands().pop() {
            Some(Command::Import { ticket, .. }) => ticket,
            other => panic!("unexpected command: {:?}", other),
        };

        app.handle_event(
            TuiEvent::ImportFinished {
                ticket,
                path: PathBuf::from("big.har"),
                result: Ok(entries(7)),
            },
            now,
        );
        assert_eq!(app.store.trace().len(), 7);
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert_eq!(status.text, "Loaded 7 entries from big.har");
    }

    #[test]
    fn test_failed_import_shows_dismissible_error() {
        let mut app = app_with(3);
        let now = Instant::now();
        let ticket = app.store.begin_import();

        app.handle_event(
            TuiEvent::ImportFinished {
                ticket,
                path: PathBuf::from("notes.txt"),
                result: Err(ImportError::UnsupportedFile(PathBuf::from("notes.txt"))),
            },
            now,
        );
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
        assert_eq!(app.store.trace().len(), 3);

        app.handle_key(key(KeyCode::Char('x')), now);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_status_expires() {
        let mut app = app_with(0);
        let t0 = Instant::now();
        app.set_status("hello", false, t0);
        app.tick(t0 + Duration::from_secs(4));
        assert!(app.status.is_some());
        app.tick(t0 + STATUS_TTL);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_superseded_import_failure_is_silent() {
        let mut app = app_with(3);
        let now = Instant::now();
        let first = app.store.begin_import();
        let _second = app.store.begin_import();

        app.handle_event(
            TuiEvent::ImportFinished {
                ticket: first,
                path: PathBuf::from("old.har"),
                result: Err(ImportError::UnsupportedFile(PathBuf::from("old.har"))),
            },
            now,
        );
        assert!(app.status.is_none());
        assert!(app.store.import_pending());
    }

    #[test]
    fn test_captured_entries_respect_recording() {
        let mut app = app_with(0);
        let now = Instant::now();
        app.handle_event(TuiEvent::Captured(entries(2)), now);
        assert_eq!(app.store.trace().len(), 2);

        app.handle_key(ctrl('r'), now);
        assert!(!app.store.is_recording());
        app.handle_event(TuiEvent::Captured(entries(2)), now);
        assert_eq!(app.store.trace().len(), 2);

        app.handle_event(TuiEvent::CaptureCleared, now);
        assert!(app.store.trace().is_empty());
    }

    #[test]
    fn test_captured_batch_rebuilds_view_once() {
        let mut app = app_with(10);
        let revision = app.store.revision();
        app.handle_event(TuiEvent::Captured(entries(2000)), Instant::now());
        assert_eq!(app.store.trace().len(), 2010);
        assert_eq!(app.store.revision(), revision + 1);
    }

    #[test]
    fn test_click_on_table_row_selects() {
        let mut app = app_with(30);
        app.regions.table_body = Rect::new(0, 5, 80, 10);
        app.virtualizer.scroll_to(4, 30);

        app.handle_mouse(click(10, 7));
        assert_eq!(app.store.selected_view_index(), Some(6));
        assert!(app.store.detail_open());
    }

    #[test]
    fn test_click_on_timeline_bar_selects_same_entry() {
        let mut app = app_with(3);
        app.regions.timeline = Rect::new(2, 1, 60, 4);
        let geometry = harscope_core::TimelineGeometry::cells(60, 4);
        let bar = app.timeline.sync(&app.store, geometry)[1];

        let column = 2 + (bar.x - 0.5).ceil() as u16;
        let row = 1 + bar.y.floor() as u16;
        app.handle_mouse(click(column, row));
        assert_eq!(app.store.selected(), Some(bar.entry));
    }

    #[test]
    fn test_click_on_header_sorts() {
        let mut app = app_with(10);
        app.regions.table_header = vec![(SortKey::Size, Rect::new(40, 4, 9, 1))];

        app.handle_mouse(click(42, 4));
        assert_eq!(app.store.sort().key, SortKey::Size);
        assert_eq!(app.store.sort().direction, SortDirection::Ascending);

        app.handle_mouse(click(42, 4));
        assert_eq!(app.store.sort().direction, SortDirection::Descending);
    }

    #[test]
    fn test_layout_toggles_save_preferences() {
        let mut app = app_with(10);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('b')), now);
        assert!(app.prefs.big_rows);
        assert_eq!(app.virtualizer.row_size(), RowSize::Big);

        app.handle_key(key(KeyCode::Char('v')), now);
        app.handle_key(ctrl('b'), now);
        assert!(!app.prefs.show_overview);
        assert!(!app.prefs.show_filters);
        assert_eq!(app.take_commands().len(), 3);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(0);
        app.handle_key(key(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit);

        // In the filter box 'q' is just text
        let mut app = app_with(0);
        app.focus = Focus::Filter;
        app.handle_key(key(KeyCode::Char('q')), Instant::now());
        assert!(!app.should_quit);
        app.handle_key(ctrl('c'), Instant::now());
        assert!(app.should_quit);
    }
}
