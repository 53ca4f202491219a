//! RoutePlay
//!
//! Loads a route and plays it back, reading controls from stdin

use anyhow::{Context, Result};
use clap::Parser;
use routeplay_adapters::{DemoSource, JsonFileSource};
use routeplay_core::RouteSource;
use routeplay_player::config::{Cli, Config};
use routeplay_player::{controls, driver, session::Session};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting RoutePlay");

    let source: Box<dyn RouteSource> = match &config.route {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(DemoSource::new()),
    };

    let session = Session::load(source.as_ref())
        .with_context(|| format!("Error loading route from {}", source.name()))?;

    // Dropping the handle on any early return stops the frame loop
    let handle = driver::spawn(session.driver(&config)?, config.loop_config());

    info!("Controls: <enter>/toggle-play, play, pause, set-speed <n>, restart, quit");
    controls::spawn_stdin_reader(handle.commands(), handle.cancel_token());

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            cancel.cancel();
        }
    });

    let driver = handle.join().await?;
    println!();
    info!(
        elapsed_ms = driver.clock().simulated_time_ms() - driver.route().start_time(),
        "Stopped"
    );

    Ok(())
}
