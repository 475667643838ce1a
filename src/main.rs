mod app;
mod config;
mod dashboard;
mod error;
mod event;
mod logging;
mod poller;
mod render;
mod status;
mod tui;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::Config;
use logging::LogTarget;

#[derive(Parser)]
#[command(name = "statusdash", about = "Terminal dashboard for the OLED monitor status API")]
struct Cli {
    /// Base URL of the status daemon (default: http://127.0.0.1:8080)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Poll interval in milliseconds (default: 3000)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Config file (default: <config dir>/statusdash/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch once, print the readings as text and exit
    Once,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref());
    if let Some(url) = cli.url {
        config.server.url = url;
    }
    if let Some(ms) = cli.interval_ms {
        config.polling.interval_ms = ms;
    }

    let target = match cli.command {
        None => LogTarget::File,
        Some(Commands::Once) => LogTarget::Stderr,
    };
    logging::init_logging(&config.logging, target);
    for warning in &config.warnings {
        tracing::warn!(event = "dash.config.warning", message = %warning);
    }

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        None => {
            tui::install_panic_hook();
            rt.block_on(app::run(config))
        }
        Some(Commands::Once) => {
            if !rt.block_on(app::run_once(config))? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
