//! Interactive viewer command

use super::Presets;
use crate::capture::start_server;
use crate::config::Preferences;
use crate::import::spawn_import;
use crate::tui::{self, Command, TuiApp, TuiEvent};
use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use harscope_core::generator::generate_entries;
use harscope_core::{ImportSource, TraceStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Options for the viewer
pub struct ViewOptions {
    pub file: Option<PathBuf>,
    pub demo: Option<usize>,
    pub listen: Option<u16>,
    pub paused: bool,
    pub presets: Presets,
}

/// Run the viewer until the user quits
pub async fn run(opts: ViewOptions) -> Result<()> {
    let mut store = TraceStore::new();
    opts.presets.apply(&mut store);
    if let Some(count) = opts.demo {
        store.set_entries(generate_entries(count, Utc::now(), &mut rand::thread_rng()));
        tracing::info!("Loaded {} demo entries", count);
    }
    store.set_recording(!opts.paused);

    let (tui_tx, mut tui_rx) = mpsc::channel::<TuiEvent>(100);
    let mut app = TuiApp::new(store, Preferences::load());

    let server = match opts.listen {
        Some(port) => {
            let (addr, handle) = start_server(port, tui_tx.clone()).await?;
            app.listen_addr = Some(addr);
            Some(handle)
        }
        None => None,
    };

    if let Some(path) = opts.file {
        app.start_import(ImportSource::Picker, path);
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui_loop(&mut terminal, &mut app, tui_tx, &mut tui_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Some(handle) = server {
        handle.abort();
    }

    result
}

async fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    tui_tx: mpsc::Sender<TuiEvent>,
    tui_rx: &mut mpsc::Receiver<TuiEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
    run_commands(app, &tui_tx);

    loop {
        // Draw UI
        terminal.draw(|f| tui::draw(f, app))?;

        tokio::select! {
            // Handle terminal input (non-blocking)
            _ = tick_interval.tick() => {
                while event::poll(Duration::from_millis(0))? {
                    app.handle_event(TuiEvent::Terminal(event::read()?), Instant::now());
                }
                app.handle_event(TuiEvent::Tick, Instant::now());
            }

            // Captured entries and finished imports
            Some(event) = tui_rx.recv() => {
                app.handle_event(event, Instant::now());
            }
        }

        run_commands(app, &tui_tx);
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the side effects the app queued
fn run_commands(app: &mut TuiApp, tui_tx: &mpsc::Sender<TuiEvent>) {
    for command in app.take_commands() {
        match command {
            Command::Import {
                ticket,
                source,
                path,
            } => {
                spawn_import(ticket, source, path, tui_tx.clone());
            }
            Command::SavePreferences => {
                if let Err(e) = app.prefs.save() {
                    tracing::warn!("Failed to save preferences: {:#}", e);
                }
            }
        }
    }
}
