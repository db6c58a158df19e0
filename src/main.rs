mod api;
mod app;
mod config;
mod events;
mod fetch;
mod logging;
mod models;
mod patch_notes;
mod progress;
mod render;
mod section;
mod slot;
mod ui;

use anyhow::{bail, Context, Result};
use api::{AnalysisApi, ApiClient};
use app::{App, NoticeKind};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use events::EventAction;
use patch_notes::PatchNotes;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    if config.once {
        logging::init_stderr()?;
    } else if let Some(path) = config.log_path() {
        logging::init_file(&path)?;
    }

    let api: Arc<dyn AnalysisApi> = Arc::new(ApiClient::new(&config.api_url, config.timeouts()));
    info!(api_url = %config.api_url, "starting tickview");

    let mut app = App::new(
        config.language,
        config.preferences(),
        PatchNotes::load(config.state_path()),
    );
    app.show_json = config.show_json;
    if let Some(ticker) = &config.ticker {
        app.ticker_input = ticker.trim().to_ascii_uppercase();
    }
    let app = Arc::new(Mutex::new(app));

    if config.once {
        run_once(app, api).await
    } else {
        let has_ticker = config.ticker.is_some();
        run_interactive(app, api, has_ticker).await
    }
}

async fn run_once(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) -> Result<()> {
    fetch::run_analysis(app.clone(), api).await;

    let mut app_lock = app.lock().await;
    app_lock.analysis.complete_now();
    if let Some(notice) = &app_lock.notice {
        if notice.kind != NoticeKind::Info {
            bail!("{}", notice.message);
        }
    }
    println!("{}", ui::plain::report_text(&app_lock));
    Ok(())
}

async fn run_interactive(
    app: Arc<Mutex<App>>,
    api: Arc<dyn AnalysisApi>,
    has_ticker: bool,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    fetch::spawn_health_check(app.clone(), api.clone());
    if has_ticker {
        fetch::spawn_analysis(app.clone(), api.clone());
    }

    let result = event_loop(&mut terminal, &app, &api).await;

    app.lock().await.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &Arc<Mutex<App>>,
    api: &Arc<dyn AnalysisApi>,
) -> Result<()> {
    loop {
        {
            let mut app_lock = app.lock().await;
            app_lock.tick();
            terminal.draw(|f| ui::render(f, &app_lock))?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(());
        }

        let action = {
            let mut app_lock = app.lock().await;
            events::handle_key_event(&mut app_lock, key.code)
        };
        match action {
            EventAction::Run => {
                fetch::spawn_analysis(app.clone(), api.clone());
            }
            EventAction::ForcePredict => {
                fetch::spawn_force_predict(app.clone(), api.clone());
            }
            EventAction::CheckHealth => {
                fetch::spawn_health_check(app.clone(), api.clone());
            }
            EventAction::Quit => return Ok(()),
            EventAction::None => {}
        }
    }
}
