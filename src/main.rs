mod app;
mod config;
mod irc;
mod logging;
mod ui;

use crate::app::notify::ShellNotifier;
use crate::app::App;
use crate::ui::TerminalDisplay;
use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)?;

    if let Some(path) = logging::init(cfg.debug) {
        info!(config = %config_path.display(), log = %path.display(), "starting");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let display = TerminalDisplay::new(
        terminal,
        cfg.nick_column_width(),
        cfg.chan_column_width(),
    );
    let notifier = ShellNotifier::new(cfg.on_highlight.clone());
    let mut app = App::new(&cfg, Box::new(display), Box::new(notifier));

    let result = match app.connect(&cfg).await {
        Ok(()) => app.run().await,
        Err(e) => Err(e),
    };
    app.close();

    restore_terminal()?;

    if let Err(e) = result {
        error!(error = %e, "exiting");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("bye");
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste)?;
    Ok(())
}
