//! Runs the simulators concurrently and ships their events in arrival order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::args::Args;
use crate::event::{EventLevel, LogEvent};
use crate::shipper::{ConnectPolicy, GeneratorError, LogstashShipper};
use crate::simulators::{ServiceSimulator, SimulatedService};

/// Service name on the generator's own start and stop notices.
pub const GENERATOR_SERVICE: &str = "log-generator";

const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub logstash_addr: String,
    pub connect: ConnectPolicy,
    pub pause_ms: RangeInclusive<u64>,
    pub max_events: Option<u64>,
    pub services: Vec<SimulatedService>,
}

impl GeneratorConfig {
    fn services(&self) -> Vec<SimulatedService> {
        if self.services.is_empty() {
            SimulatedService::ALL.to_vec()
        } else {
            self.services.clone()
        }
    }
}

impl From<&Args> for GeneratorConfig {
    fn from(args: &Args) -> Self {
        let min = args.min_pause_ms.min(args.max_pause_ms);
        let max = args.min_pause_ms.max(args.max_pause_ms);
        Self {
            logstash_addr: args.logstash_host.clone(),
            connect: ConnectPolicy {
                attempts: args.connect_attempts,
                delay: Duration::from_millis(args.retry_delay_ms),
            },
            pause_ms: min..=max,
            max_events: args.max_events,
            services: args.services.clone(),
        }
    }
}

/// Counts of shipped simulated events. Start and stop notices are not
/// included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub shipped: u64,
    pub errors: u64,
    pub reconnects: u64,
}

/// Connect, then ship events until `max_events` is reached.
///
/// Without a limit this only returns on a delivery error, so callers race
/// it against a shutdown signal.
pub async fn run(config: GeneratorConfig) -> Result<GeneratorStats, GeneratorError> {
    let mut shipper = LogstashShipper::connect(config.logstash_addr.clone(), config.connect).await?;
    shipper
        .ship(&LogEvent::notice(GENERATOR_SERVICE, EventLevel::Info, "Log generator started"))
        .await?;

    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let mut simulators = JoinSet::new();
    for service in config.services() {
        simulators.spawn(simulate(
            service.simulator(),
            StdRng::from_entropy(),
            config.pause_ms.clone(),
            tx.clone(),
        ));
    }
    drop(tx);
    info!(services = ?config.services(), max_events = ?config.max_events, "Simulators started");

    let mut stats = GeneratorStats::default();
    while !matches!(config.max_events, Some(limit) if stats.shipped >= limit) {
        let Some(event) = rx.recv().await else {
            break;
        };
        shipper.ship(&event).await?;
        stats.shipped += 1;
        if event.is_error() {
            stats.errors += 1;
        }
    }
    simulators.shutdown().await;

    stats.reconnects = shipper.reconnects();
    shipper
        .ship(&LogEvent::notice(GENERATOR_SERVICE, EventLevel::Info, "Log generator finished"))
        .await?;
    shipper.close().await?;
    info!(?stats, "Log generator finished");
    Ok(stats)
}

async fn simulate(
    mut simulator: Box<dyn ServiceSimulator>,
    mut rng: StdRng,
    pause_ms: RangeInclusive<u64>,
    events: mpsc::Sender<LogEvent>,
) {
    loop {
        let event = simulator.next_event(&mut rng);
        if events.send(event).await.is_err() {
            debug!(service = simulator.service(), "Event queue closed");
            return;
        }
        let pause = rng.gen_range(pause_ms.clone());
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }
}
