use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use ptop::app::{self, Action, Config, Dashboard};
use ptop::metrics::ProcessSource;

fn init_tracing(config: &Config) -> Result<()> {
    let directive = if config.ui.debug_log {
        "ptop=debug"
    } else {
        "ptop=info"
    };
    let log_path = Config::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().context("Invalid log directive")?),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> Result<()> {
    let runtime = app::build_runtime()?;
    let result = runtime.block_on(run_app());
    app::shutdown_runtime(runtime);
    result
}

async fn run_app() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config)?;
    tracing::info!("=== ptop starting ===");
    if let Some(e) = &config_error {
        tracing::warn!("Using default config: {:#}", e);
    }

    // Setup terminal
    enable_raw_mode().context("Failed to initialize terminal")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to initialize terminal");
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_terminal();
            return Err(e).context("Failed to initialize terminal");
        }
    };

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    let mut dashboard = Dashboard::new(config.clone());
    if let Some(e) = config_error {
        dashboard.log_warn(format!("Config ignored: {:#}", e));
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let source = app::shared_source(ProcessSource::new(&config.source));
    let ticker = app::spawn_ticker(
        action_tx.clone(),
        Duration::from_millis(config.ui.tick_rate_ms),
    );
    let input = app::spawn_input(action_tx.clone(), config.keybinds.clone());

    let result = app::run(
        &mut terminal,
        &mut dashboard,
        source,
        action_tx,
        &mut action_rx,
    )
    .await;

    ticker.abort();
    input.abort();

    // Cleanup
    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("ptop exited with error: {:#}", e);
    }
    tracing::info!("=== ptop stopped ===");
    result
}
