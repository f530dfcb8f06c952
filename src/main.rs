use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use log::{error, info};
use tokio::sync::mpsc;

mod commands;
mod config;
mod geo;
mod location;
mod messages;
mod remote;
mod state;
mod tracker;
mod view;

#[derive(Parser, Debug)]
#[command(version, about = "Track an ambulance beacon and compare it with your own position")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "tracker.toml")]
    config: PathBuf,

    /// Status endpoint, overriding the config file
    #[arg(long)]
    url: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    if cli.verbose {
        logger.filter_module("ambulance_tracker", log::LevelFilter::Debug);
    }
    logger.init();

    let config = config::AppConfig::load(&cli.config)?;
    let url = cli.url.unwrap_or_else(|| config.endpoint_url());
    info!("Tracking beacon at {}", url);

    let client = remote::HttpStateClient::new(url, config.request_timeout())
        .context("building status client")?;
    let location = location::HostLocation::from_config(config.location.as_ref());
    info!("Observer location source: {:?}", location);
    let view = view::TerminalView::new(config.distance_mode());

    let (cmd_tx, cmd_rx) = mpsc::channel(10);

    let ctrl_c_tx = cmd_tx.clone();
    tokio::task::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Error waiting for Ctrl-C: {:?}", err);
            return;
        }
        let _ = ctrl_c_tx.send(commands::UserCommand::Quit).await;
    });
    commands::spawn_stdin_reader(cmd_tx);

    let core = tracker::Tracker::new(
        Arc::new(client),
        Arc::new(location),
        view,
        config.poll_interval(),
    );
    let state = core.run_loop(cmd_rx).await;
    info!(
        "Last beacon status {} at {:?}",
        state.beacon_status, state.beacon_position
    );

    Ok(())
}
