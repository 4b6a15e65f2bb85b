//! Command-line arguments.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Drive synthetic traffic against the user service", long_about = None)]
pub struct Args {
    /// Base URL of the user service
    #[arg(long, env = "USER_SERVICE_URL", default_value = "http://localhost:3001")]
    pub user_url: String,

    /// Lower bound of the pause between iterations
    #[arg(long, default_value_t = 1000)]
    pub min_delay_ms: u64,

    /// Upper bound of the pause between iterations
    #[arg(long, default_value_t = 5000)]
    pub max_delay_ms: u64,

    /// Stop after this many iterations (runs until interrupted when absent)
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Probability of pausing as if the network had dropped
    #[arg(long, default_value_t = 0.1)]
    pub network_error_rate: f64,
}
