use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use educhat_core::config::BASE_URL_ENV;
use educhat_core::{ChatMode, Config};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, AppOptions};
use tui::{EventHandler, Tui, TICK_RATE};

#[derive(Parser)]
#[command(name = "educhat")]
#[command(about = "Chat with your study documents and quiz yourself on them")]
#[command(version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,
    /// Start location; its `selected_docs` parameter pre-selects documents
    #[arg(long)]
    url: Option<String>,
    /// Chat mode: standard or eli5
    #[arg(short, long)]
    mode: Option<String>,
    /// Resume an existing chat session
    #[arg(long)]
    session: Option<String>,
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("educhat");
    fs::create_dir_all(&log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("educhat.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("educhat=info,educhat_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    let mut options = AppOptions::from_config(&config);
    if let Some(base_url) = cli.base_url {
        options.base_url = base_url;
    }
    if let Some(url) = cli.url {
        options.start_url = url;
    }
    if let Some(mode) = cli.mode.as_deref() {
        options.chat_mode = ChatMode::from_str(mode)
            .with_context(|| format!("Unknown chat mode '{}'", mode))?;
    }
    options.session_id = cli.session;

    info!(base_url = %options.base_url, start_url = %options.start_url, "starting");
    let mut app = App::new(options)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        warn!(error = %e, "exited with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    app.start();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }
    }

    Ok(())
}
