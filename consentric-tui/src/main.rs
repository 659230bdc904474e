//! consentric - consent-gated analytics demo
//!
//! Terminal UI that drives the metrics facade interactively: grant and
//! revoke consent categories, run a session and watch what reaches the
//! wrapped service.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use consentric_core::{Config, MemoryService, MetricsFacade, SqliteStore};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

#[derive(Parser)]
#[command(name = "consentric", about = "Consent-gated analytics demo")]
struct Cli {
    /// Path to a config file (defaults to the XDG location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// App key to use when the config does not provide one
    #[arg(long, default_value = "consentric-demo")]
    app_key: String,

    /// Run without a durable store (consent resets on exit)
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };
    if config.app_key.trim().is_empty() {
        config.app_key = cli.app_key.clone();
    }

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        consentric_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("consentric TUI starting up");

    // Open the durable store; a failed open degrades to the storeless path
    let store: Option<Box<dyn consentric_core::KeyValueStore>> = if cli.ephemeral {
        None
    } else {
        let store_path = Config::store_path();
        match SqliteStore::open(&store_path) {
            Ok(store) => {
                tracing::info!(path = %store_path.display(), "opened consent store");
                Some(Box::new(store))
            }
            Err(e) => {
                tracing::warn!(error = %e, "consent store unavailable, running ephemeral");
                None
            }
        }
    };

    let metrics = MetricsFacade::new(config, MemoryService::new(), store)
        .context("failed to construct metrics facade")?;

    let mut app = App::new(metrics);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("consentric TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
