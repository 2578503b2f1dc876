//! Portal de Acessos - a terminal front-end for the agent credential API.
//!
//! Agents look up the credentials tied to their extension; an administrator
//! can log in for a time-limited session and register new agents.

mod app;
mod ui;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use acessos_core::api::{ApiClient, LookupOutcome};
use acessos_core::notice::Notice;
use acessos_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefix of the daily rotated log files
const LOG_FILE_PREFIX: &str = "acessos.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Used by one-shot commands that never own the terminal.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file so output never corrupts the alternate screen.
/// The returned guard flushes pending lines when dropped.
fn init_file_tracing(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--lookup" {
        init_stderr_tracing();
        let Some(extension) = args.get(2) else {
            eprintln!("Uso: acessos --lookup <ramal>");
            return Ok(ExitCode::FAILURE);
        };
        return lookup_once(&config, extension).await;
    }

    // Initialize logging
    let _log_guard = init_file_tracing(&config)?;
    info!("Portal de Acessos starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!("Main loop failed: {}", e);
        eprintln!("Error: {}", e);
    }

    info!("Portal de Acessos shutting down");
    Ok(ExitCode::SUCCESS)
}

/// Look up one extension and print its credential rows to stdout.
async fn lookup_once(config: &Config, extension: &str) -> Result<ExitCode> {
    let client = ApiClient::new(config.api_base()?)?;
    info!("Looking up extension {} at {}", extension, client.base());

    match client.lookup(extension.trim()).await {
        Ok(LookupOutcome::Found(record)) => {
            println!("Acessos do Ramal {}", record.extension);
            for row in record.credential_rows() {
                println!("{:<22}{}", row.title, row.value);
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(LookupOutcome::NotFound) => {
            eprintln!("{}", Notice::agent_not_found(extension).text);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "Lookup failed");
            eprintln!("{}", Notice::lookup_failed().text);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            let event = event::read()?;
            // Settle a due expiry before the event counts as activity
            app.check_background_tasks();

            match event {
                Event::Key(key) => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    app.note_activity();
                    if handle_input(app, key).await? {
                        return Ok(());
                    }
                }
                Event::Mouse(_) => app.note_activity(),
                _ => {}
            }
        }

        // Check for completed background tasks and session transitions
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
