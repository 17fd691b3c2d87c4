//! nirimgr daemon
//!
//! Subscribes to niri's event stream and runs configured actions.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nirimgr_daemon::engine::{ActionRegistry, Dispatcher};
use nirimgr_daemon::niri_ipc::{
    EventRegistry, NiriEventReader, NiriEventStream, SocketPool, DEFAULT_CHANNEL_BUFFER,
};

#[derive(Parser, Debug)]
#[command(name = "nirimgrd")]
#[command(about = "Rule-based window and workspace manager for niri")]
#[command(version)]
struct Args {
    /// Path to configuration file (default: config/config.json, then ~/.config/nirimgr/config.json)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = nirimgr_config::find_config(args.config.as_deref())?;
    let config = nirimgr_config::load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    nirimgr_daemon::init_logging(config.log_level);
    tracing::info!(
        path = %config_path.display(),
        rules = config.rules.len(),
        events = config.events.len(),
        "Loaded configuration"
    );
    nirimgr_daemon::log_config_warnings(&config);

    let stream = NiriEventStream::connect()
        .await
        .context("could not subscribe to the niri event stream")?;
    let pool = SocketPool::new(stream.socket_path());

    let (reader, notifications) =
        NiriEventReader::new(Arc::new(EventRegistry::new()), DEFAULT_CHANNEL_BUFFER);
    let reader_handle = reader.spawn(stream);

    let mut dispatcher = Dispatcher::new(Arc::new(config), ActionRegistry::new(), pool);

    tokio::select! {
        _ = dispatcher.run(notifications) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted, shutting down...");
            reader_handle.abort();
            return Ok(());
        }
    }

    match reader_handle.await {
        Ok(result) => result.context("niri event stream failed")?,
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e).context("event reader task panicked"),
    }

    tracing::info!("Shutting down...");
    Ok(())
}
