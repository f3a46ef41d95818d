//! ratewatch - currency pair oscillation tracker.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Currency pair rate oscillation tracker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RATEWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ratewatch_telemetry::init_logging()?;

    info!("Starting ratewatch v{}", env!("CARGO_PKG_VERSION"));

    let config = ratewatch_tracker::AppConfig::load(args.config.as_deref())?;
    info!(
        pairs = %config.tracker.pairs,
        base_url = %config.ticker.base_url,
        "Configuration loaded"
    );

    let app = ratewatch_tracker::Application::new(config)?;
    app.run().await?;

    Ok(())
}
