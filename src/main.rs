// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

use tls_verdict::config::Settings;
use tls_verdict::logging::initialize_logging;
use tls_verdict::{AssessmentClient, Orchestrator, SslLabsClient};

mod app;
mod ui;

use app::{App, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let log_path = initialize_logging()?;
    let settings = Settings::from_env()?;
    info!(log = %log_path.display(), api = %settings.api_url, "Starting tls-verdict.");

    let client = SslLabsClient::new(&settings.api_url, settings.request_timeout)?;
    let orchestrator = Orchestrator::new(client, settings.orchestrator());

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();
    let outcome = run(&mut terminal, &mut app, &orchestrator).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;

    orchestrator.shutdown().await;
    info!("tls-verdict stopped.");
    outcome
}

async fn run<B: Backend, C: AssessmentClient>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    orchestrator: &Orchestrator<C>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(app, orchestrator)?;
        }
        app.on_tick(orchestrator);
        // Let the scan workers run between frames.
        tokio::task::yield_now().await;
    }
    Ok(())
}

fn handle_events<C: AssessmentClient>(app: &mut App, orchestrator: &Orchestrator<C>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Idle => handle_idle_input(app, key.code, orchestrator),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => match key.code {
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Char('c') | KeyCode::Esc => app.cancel(orchestrator),
                    _ => {}
                },
            }
        }
    }
    Ok(())
}

fn handle_idle_input<C: AssessmentClient>(app: &mut App, key_code: KeyCode, orchestrator: &Orchestrator<C>) {
    match key_code {
        KeyCode::Char('q') if app.input.is_empty() => app.quit(),
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => app.submit(orchestrator),
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}
