use distributori_client::backend::HttpApi;
use distributori_client::command::HELP_TEXT;
use distributori_client::config::{self, ConfigSource};
use distributori_client::console::{self, Flow};
use distributori_client::logging;
use distributori_client::map::{HeadlessMap, MarkerSet};
use distributori_client::notify::ConsoleNotifier;
use distributori_client::Session;

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = config::read_config()?;
    let _logging_guard = logging::init_logging(&config.logging, &config.log_level)?;

    tracing::info!("Distributori client started.");
    match source {
        ConfigSource::File(path) => tracing::info!("Configuration loaded from {}", path),
        ConfigSource::Defaults { missing } => {
            tracing::warn!("Config file {} not found, using defaults", missing)
        }
    }

    let api = Arc::new(HttpApi::new(&config.api)?);
    let map = HeadlessMap::new(config.map.initial_viewport());
    let session = Arc::new(Session::new(
        api,
        Arc::new(ConsoleNotifier),
        MarkerSet::new(map, config.map.focus_zoom),
    ));

    // Show everything once at start-up
    console::dispatch(&session, "/load").await;
    println!("{}", HELP_TEXT);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed.");
                    break;
                };
                if console::dispatch(&session, &line).await == Flow::Quit {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received.");
                break;
            }
        }
    }

    Ok(())
}
