//! Dubai Padel Map - a terminal directory of padel clubs and player communities.
//!
//! Listings come from a hosted REST database when one is configured and
//! reachable, and from the bundled data files otherwise.

mod app;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use padelmap_core::{load_directory, seed_database, Bundle, Config, CredentialStore, Gateway, LoadReason};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the terminal UI owns the screen
const LOG_FILE: &str = "padelmap.log";

/// Initialize the tracing subscriber for logging.
///
/// With a log directory, output goes to a file there (the terminal UI owns
/// stdout and stderr). Without one, it goes to stderr. Use the RUST_LOG env
/// var to control the level (e.g., RUST_LOG=padelmap_core=debug).
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return None;
    };

    if std::fs::create_dir_all(dir).is_err() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::sink))
            .with(filter)
            .init();
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--export" {
        init_tracing(None);
        return export_directory(&config, args.get(2).map(PathBuf::from)).await;
    }
    if args.len() > 1 && args[1] == "--seed" {
        init_tracing(None);
        return seed_remote(&config).await;
    }
    if args.len() > 1 && args[1] == "--set-key" {
        init_tracing(None);
        return set_api_key(&config);
    }
    if args.len() > 1 && args[1] == "--clear-key" {
        init_tracing(None);
        return clear_api_key(&config);
    }

    // Initialize logging; the guard flushes the log file on exit
    let _guard = init_tracing(config.log_dir().ok().as_deref());
    // A config that failed to parse is never overwritten on exit
    let config_path = match config_error {
        None => Config::config_path().ok(),
        Some(_) => None,
    };
    if let Some(e) = &config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!("padelmap starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?.with_config_path(config_path);
    app.start_load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.save_preferences();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("padelmap shutting down");
    Ok(())
}

fn bundle_for(config: &Config) -> Result<Bundle> {
    Bundle::load(config.data_dir.as_deref())
}

/// Run the data source selector and print the directory as JSON
async fn export_directory(config: &Config, out_dir: Option<PathBuf>) -> Result<()> {
    let bundle = bundle_for(config)?;
    let client = config.directory_client()?;
    let directory = load_directory(client.as_ref(), &bundle).await;
    eprintln!("{}", directory.status_message());

    println!("{}", serde_json::to_string_pretty(&directory)?);

    if let Some(dir) = out_dir {
        directory.to_bundle().write_to_dir(&dir)?;
        eprintln!("Wrote data files to {}", dir.display());
    }
    Ok(())
}

/// Upload the bundled listings to an empty database
async fn seed_remote(config: &Config) -> Result<()> {
    let Some(client) = config.directory_client()? else {
        bail!("Database not configured. Set database_url in the config or PADELMAP_DATABASE_URL.");
    };
    let bundle = bundle_for(config)?;

    let directory = load_directory(Some(&client), &bundle).await;
    match directory.reason {
        LoadReason::DatabaseEmpty => {}
        LoadReason::Loaded => bail!("Database already has listings; refusing to seed."),
        LoadReason::ConnectionFailed | LoadReason::NotConfigured => {
            bail!("Could not reach the database.")
        }
    }

    eprintln!(
        "Seeding {} clubs and {} communities...",
        bundle.clubs.len(),
        bundle.communities.len()
    );
    let report = seed_database(&Gateway::new(client), &bundle).await;
    eprintln!(
        "Saved {} clubs and {} communities.",
        report.clubs_saved, report.communities_saved
    );

    if !report.is_complete() {
        bail!("{} record(s) failed to save", report.failed);
    }
    Ok(())
}

/// Prompt for the database API key and store it in the OS keychain
fn set_api_key(config: &Config) -> Result<()> {
    let Some(url) = config.database_url() else {
        bail!("Set database_url in the config or PADELMAP_DATABASE_URL first.");
    };

    let key = rpassword::prompt_password(format!("API key for {}: ", url))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("No key entered.");
    }

    CredentialStore::store(&url, key)?;
    eprintln!("API key saved to the system keychain.");
    Ok(())
}

/// Remove the stored database API key from the OS keychain
fn clear_api_key(config: &Config) -> Result<()> {
    let Some(url) = config.database_url() else {
        bail!("No database configured.");
    };
    CredentialStore::delete(&url)?;
    eprintln!("API key removed from the system keychain.");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Writes run after a draw so their status is on screen meanwhile
        if app.has_pending_write() {
            app.run_pending_write().await;
            continue;
        }

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
