//! Command-line arguments.

use clap::Parser;

use crate::simulators::SimulatedService;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Stream synthetic service logs to Logstash", long_about = None)]
pub struct Args {
    /// Logstash TCP input, `host:port`
    #[arg(long, env = "LOGSTASH_HOST", default_value = "localhost:5000")]
    pub logstash_host: String,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = 10)]
    pub connect_attempts: u32,

    /// Pause between connection attempts
    #[arg(long, default_value_t = 5000)]
    pub retry_delay_ms: u64,

    /// Lower bound of each simulator's pause between events
    #[arg(long, default_value_t = 500)]
    pub min_pause_ms: u64,

    /// Upper bound of each simulator's pause between events
    #[arg(long, default_value_t = 2500)]
    pub max_pause_ms: u64,

    /// Stop after shipping this many simulated events (runs until
    /// interrupted when absent)
    #[arg(long)]
    pub max_events: Option<u64>,

    /// Services to simulate, comma separated (all when absent)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub services: Vec<SimulatedService>,
}
