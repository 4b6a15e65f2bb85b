//! Log generator entry point.

use anyhow::Result;
use clap::Parser;
use log_generator::{run, Args, GeneratorConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "log_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!(logstash = %args.logstash_host, "Starting log generator");

    tokio::select! {
        result = run(GeneratorConfig::from(&args)) => {
            let stats = result?;
            info!(?stats, "Log generator stopped");
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping log generator"),
    }
    Ok(())
}
