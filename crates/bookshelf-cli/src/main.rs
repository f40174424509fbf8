//! Bookshelf - terminal client for a personal book catalog.
//!
//! This is the entry point for the `bookshelf` binary.

mod app;
mod input;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use bookshelf_api::{ApiConfig, HttpGateway};
use bookshelf_auth::{session_path, FileSessionStore, MemorySessionStore, SessionContext};
use bookshelf_control::{AppContext, Route, Router};

use app::{App, TICK_RATE};

/// Default tracing directive when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "bookshelf=debug,warn";

/// Bookshelf - terminal client for a personal book catalog.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog server URL.
    #[arg(long, env = "BOOKSHELF_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Where to keep the session token.
    #[arg(long, env = "BOOKSHELF_SESSION")]
    session_file: Option<PathBuf>,

    /// Keep the session in memory only.
    #[arg(long, conflicts_with = "session_file")]
    ephemeral: bool,

    /// Request timeout in seconds.
    #[arg(long, env = "BOOKSHELF_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    /// Write logs to this file instead of stderr. Implies --debug.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args)?;

    // Build the gateway and session
    let mut config = ApiConfig::new(args.server.as_str());
    config.request_timeout_seconds = args.timeout;
    let gateway = HttpGateway::new(config).context("failed to build HTTP client")?;
    let session = open_session(&args)?;
    let ctx = AppContext::new(Arc::new(gateway), session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app; a stored session skips straight to the book list
    let mut app = App::new(Router::new(ctx, Route::Home), args.server.as_str());

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    if !args.debug && args.log_file.is_none() {
        return Ok(());
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if let Some(path) = &args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

fn open_session(args: &Args) -> anyhow::Result<SessionContext> {
    if args.ephemeral {
        tracing::debug!("Using in-memory session");
        return Ok(SessionContext::new(MemorySessionStore::default()));
    }
    let path = args.session_file.clone().unwrap_or_else(session_path);
    let store = FileSessionStore::open(path.clone()).with_context(|| {
        format!(
            "failed to open session file {} (delete it to sign in again)",
            path.display()
        )
    })?;
    tracing::debug!(path = %path.display(), "Using session file");
    Ok(SessionContext::new(store))
}

/// Main event loop.
///
/// Redraws on every tick and immediately after a request completes.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        // Tick animation frame
        app.tick_animation();

        // Render
        terminal.draw(|f| ui::render(f, app))?;

        tokio::select! {
            // Terminal events - poll with short timeout
            () = tokio::time::sleep(TICK_RATE) => {
                while event::poll(Duration::from_millis(0)).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        input::handle_event(app, evt);
                    }
                }
            }

            // Finished requests of the mounted view
            Some(completion) = app.router.next_completion() => {
                app.apply(completion);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
