//! Market Data Router
//!
//! Reads `tick`, `subscribe` and `unsubscribe` commands from stdin and writes
//! notifications to stdout. Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{BufReader, BufWriter};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_data_router::{
    CommandLoop, CommandProcessor, LogFormat, MarketConfig, Publisher, ServiceMetrics, Settings,
};

/// Route live prices to entitled subscribers
#[derive(Parser)]
#[command(name = "market-data-router")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Market universe JSON file (securities and user entitlements)
    universe: Option<PathBuf>,

    /// Currency all exchange rates are quoted against
    #[arg(long)]
    base_currency: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Write Prometheus text metrics to this file on shutdown
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(format) = cli.log_format {
        settings.log_format = format;
    }

    init_tracing(settings.log_format);
    info!("Starting Market Data Router");

    let universe_path = cli
        .universe
        .or_else(|| settings.universe_path.clone().map(PathBuf::from))
        .ok_or_else(|| {
            anyhow::anyhow!("no market universe given (argument or MARKET_DATA_UNIVERSE_PATH)")
        })?;

    let mut universe = MarketConfig::load(&universe_path)?;
    if let Some(base) = cli.base_currency.or(settings.base_currency.clone()) {
        universe.base_currency = base;
    }
    info!(
        path = %universe_path.display(),
        securities = universe.securities.len(),
        users = universe.entitlements.len(),
        base_currency = %universe.base_currency,
        "Configuration loaded"
    );

    let processor = CommandProcessor::from_config(&universe);
    let publisher = Publisher::new(BufWriter::new(tokio::io::stdout()));
    let metrics = ServiceMetrics::new()?;

    let mut command_loop = CommandLoop::new(processor, publisher, metrics);
    let summary = command_loop.run(BufReader::new(tokio::io::stdin())).await?;
    info!(
        commands = summary.commands,
        failures = summary.failures,
        notifications = summary.notifications,
        quit = summary.quit,
        "Market Data Router stopped"
    );

    let metrics_path = cli
        .metrics_out
        .or_else(|| settings.metrics_path.clone().map(PathBuf::from));
    if let Some(path) = metrics_path {
        std::fs::write(&path, command_loop.metrics().encode()?)?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
