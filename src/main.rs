//! Petcare - Pet Health Portal Client
//!
//! A vim-style terminal client for the pet-health portal.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

mod api;
mod app;
mod events;
mod field;
mod i18n;
mod input;
mod tracing_setup;
mod ui;

use api::HttpPortal;
use app::{config::FileConfig, App, AppConfig};
use i18n::Language;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "petcare", version, about = "Terminal client for the pet-health portal")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH", env = "PETCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Portal base URL
    #[arg(long, value_name = "URL", env = "PETCARE_BASE_URL")]
    base_url: Option<String>,

    /// Anti-forgery token sent with the login form
    #[arg(long, value_name = "TOKEN", env = "PETCARE_CSRF_TOKEN", hide_env_values = true)]
    csrf_token: Option<String>,

    /// Delay before a typed password is masked
    #[arg(long, value_name = "MS")]
    mask_delay_ms: Option<u64>,

    /// Interface language (en, zh-Hant, ja)
    #[arg(long, value_name = "CODE")]
    language: Option<Language>,

    /// Log file location
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Browse without signing in
    #[arg(long, action = ArgAction::SetTrue)]
    guest: bool,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let path = self.config.unwrap_or_else(AppConfig::default_path);
        let mut config = AppConfig::default();
        config.apply_file(FileConfig::load(&path)?);

        if let Some(v) = self.base_url {
            config.base_url = v;
        }
        if let Some(v) = self.csrf_token {
            config.csrf_token = Some(v);
        }
        if let Some(ms) = self.mask_delay_ms {
            config.mask_delay = Duration::from_millis(ms);
        }
        if let Some(v) = self.language {
            config.language = v;
        }
        if let Some(v) = self.log_file {
            config.log_file = v;
        }
        config.guest = self.guest;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tracing_config = tracing_setup::TracingConfig { debug: cli.debug };
    let config = cli.into_config()?;

    tracing_setup::init(&tracing_config, &config.log_file)?;
    tracing::info!(base_url = %config.base_url, language = %config.language, "starting petcare");

    let portal = HttpPortal::new(&config.base_url, &config.login_path, config.request_timeout)
        .context("Failed to build HTTP client")?;

    // Setup terminal
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(config, Arc::new(portal));
    app.start();

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("exiting");
    result
}

/// Leave raw mode before the default hook prints the panic
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        tracing::error!(panic = %info, "panicked");
        default_hook(info);
    }));
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| {
            app.render(frame);
        })?;

        let now = Instant::now();
        let timeout = app
            .next_deadline()
            .map_or(POLL_INTERVAL, |deadline| deadline.saturating_duration_since(now).min(POLL_INTERVAL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
