//! Traffic bot entry point.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use traffic_bot::{Args, BotConfig, TrafficBot, UserClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traffic_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!(user_url = %args.user_url, "Traffic bot configured");

    let client = UserClient::new(args.user_url.clone())?;
    let mut bot = TrafficBot::new(client, BotConfig::from(&args), StdRng::from_entropy());

    tokio::select! {
        stats = bot.run() => info!(?stats, "Traffic bot stopped"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping traffic bot"),
    }
    Ok(())
}
