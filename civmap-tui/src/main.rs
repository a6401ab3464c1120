//! Terminal dashboard for browsing, searching, and exporting central Uganda civic facilities.

mod app;
mod config;
mod input;
mod ui;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use civmap_core::{
    CivmapService, DISPLAY_LIMIT, ExportFormat, JsonFileLikeStore, SearchOutcome, search,
};
use civmap_provider_boundaries::boundary_port;
use civmap_provider_uganda::UgandaFacilityPort;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::{Command, Config};
use crate::input::Action;

/// Boundary downloads give up after this long.
const HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config.log_file)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("civmap/0.1")
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let facilities = UgandaFacilityPort::new();
    let boundaries = boundary_port(&config.boundaries, client);
    let likes = Box::new(JsonFileLikeStore::new(&config.likes_file));
    let service = CivmapService::load(&facilities, boundaries.as_ref(), likes)
        .await
        .context("failed to load facilities")?;

    match &config.command {
        Some(Command::Export { format, out }) => {
            let path = out.clone().unwrap_or_else(|| config.export_path(*format));
            return export_to_file(&service, *format, &path);
        }
        Some(Command::Search { query, suggest }) => {
            return print_matches(&service, query, *suggest);
        }
        None => {}
    }

    // App state
    let app = App::new(service, config.export_dir.clone());

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("cannot install log subscriber")?;
    Ok(())
}

fn export_to_file(service: &CivmapService, format: ExportFormat, path: &Path) -> Result<()> {
    let document = service.export(format)?;
    fs::write(path, document).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), %format, "wrote export");
    writeln!(io::stdout().lock(), "{}", path.display())?;
    Ok(())
}

fn print_matches(service: &CivmapService, query: &str, suggest: bool) -> Result<()> {
    let outcome = if suggest {
        service.suggest(query)?
    } else {
        search(query, service.facilities())?
    };
    let mut out = io::stdout().lock();
    match outcome {
        SearchOutcome::Cleared => writeln!(out, "no query")?,
        SearchOutcome::Focus(facility) => {
            writeln!(out, "{}\t{}\t{}", facility.name, facility.kind, facility.district)?;
        }
        SearchOutcome::Ranked(hits) => {
            for hit in hits.iter().take(DISPLAY_LIMIT) {
                writeln!(
                    out,
                    "{:>3}\t{}\t{}\t{}",
                    hit.score, hit.facility.name, hit.facility.kind, hit.facility.district
                )?;
            }
        }
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Search => app.run_search(),
                Action::ToggleLike(id) => app.toggle_like(&id),
                Action::Export(format) => app.export(format),
                Action::UploadBoundary => app.upload(),
            }
        }
    }

    Ok(())
}
