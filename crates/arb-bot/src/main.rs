//! Divergence arbitrage bot entry point.
//!
//! Default mode runs the detector, ladder and close-capture loops.
//! `--capture-close-once` stores the current reference close and exits.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Venue/reference divergence arbitrage bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ARB_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Capture the reference daily close once and exit
    #[arg(long)]
    capture_close_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    arb_telemetry::init_logging()?;

    info!("Starting arb-bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > ARB_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ARB_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = arb_bot::AppConfig::from_file(&config_path)?;
    info!(
        venue = %config.symbols.venue,
        reference = %config.symbols.reference,
        "Configuration loaded"
    );

    let app = arb_bot::Application::new(config)?;

    if args.capture_close_once {
        let record = app.capture_close_once().await?;
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    info!("Running preflight validation...");
    app.run_preflight().await?;

    app.run().await?;

    Ok(())
}
