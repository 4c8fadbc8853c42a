use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use linkshelf::config::StaticConfig;
use linkshelf::system::AppContext;
use linkshelf::system::logging::init_logging;
use linkshelf::system::shutdown::{stop_background_task, wait_for_signal};

/// In-memory link registry with click quotas and TTL eviction
#[derive(Parser, Debug)]
#[command(name = "linkshelf", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Print a sample configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.print_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    let config = StaticConfig::load_from(&args.config)
        .with_context(|| format!("Failed to load configuration from '{}'", args.config))?;

    let _guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting linkshelf (code length {}, ttl {}h, default limit {})",
        config.links.code_length, config.links.default_ttl_hours, config.links.default_click_limit
    );

    let context = AppContext::new(config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Arc::new(context.sweeper()).spawn(shutdown_rx);

    wait_for_signal().await;
    stop_background_task(&shutdown_tx, sweeper).await;

    info!("Shutdown complete");
    Ok(())
}
