//! The traffic loop.

use crate::args::Args;
use crate::client::{BotError, NewUser, UserClient};
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chen", "Dana", "Emil", "Fatima", "Goran", "Hana", "Ivan", "Julia",
];
const LAST_NAMES: &[&str] = &[
    "Novak", "Garcia", "Kowalski", "Tanaka", "Okafor", "Lindqvist", "Moreau", "Rossi",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a user, wait briefly, then read it back.
    CreateThenGet,
    /// Read a random id, which is expected to miss.
    GetRandom,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub delay_ms: RangeInclusive<u64>,
    pub follow_up_delay_ms: RangeInclusive<u64>,
    pub network_error_rate: f64,
    pub network_error_pause_ms: RangeInclusive<u64>,
    pub iterations: Option<u64>,
}

impl BotConfig {
    /// Zero delays, no simulated outages. Useful for driving the bot in tests.
    pub fn immediate(iterations: u64) -> Self {
        Self {
            delay_ms: 0..=0,
            follow_up_delay_ms: 0..=0,
            network_error_rate: 0.0,
            network_error_pause_ms: 0..=0,
            iterations: Some(iterations),
        }
    }
}

impl From<&Args> for BotConfig {
    fn from(args: &Args) -> Self {
        let min = args.min_delay_ms.min(args.max_delay_ms);
        let max = args.min_delay_ms.max(args.max_delay_ms);
        Self {
            delay_ms: min..=max,
            follow_up_delay_ms: 500..=2000,
            network_error_rate: args.network_error_rate.clamp(0.0, 1.0),
            network_error_pause_ms: 2000..=5000,
            iterations: args.iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotStats {
    pub iterations: u64,
    pub created: u64,
    pub fetched: u64,
    pub not_found: u64,
    pub errors: u64,
}

pub struct TrafficBot<R> {
    client: UserClient,
    config: BotConfig,
    rng: R,
    stats: BotStats,
}

impl<R: Rng> TrafficBot<R> {
    pub fn new(client: UserClient, config: BotConfig, rng: R) -> Self {
        Self {
            client,
            config,
            rng,
            stats: BotStats::default(),
        }
    }

    pub fn stats(&self) -> BotStats {
        self.stats
    }

    /// Runs until the configured iteration count is reached.
    pub async fn run(&mut self) -> BotStats {
        info!(iterations = ?self.config.iterations, "Starting traffic bot");
        while !matches!(self.config.iterations, Some(limit) if self.stats.iterations >= limit) {
            self.iteration().await;
        }
        info!(stats = ?self.stats, "Traffic bot finished");
        self.stats
    }

    async fn iteration(&mut self) {
        let delay = self.pick(self.config.delay_ms.clone());
        tokio::time::sleep(delay).await;

        let action = if self.rng.gen_bool(0.5) {
            Action::CreateThenGet
        } else {
            Action::GetRandom
        };
        self.perform(action).await;

        if self.config.network_error_rate > 0.0 && self.rng.gen_bool(self.config.network_error_rate)
        {
            warn!("Simulating network error");
            let pause = self.pick(self.config.network_error_pause_ms.clone());
            tokio::time::sleep(pause).await;
        }
        self.stats.iterations += 1;
    }

    pub async fn perform(&mut self, action: Action) {
        let result = match action {
            Action::CreateThenGet => self.create_then_get().await,
            Action::GetRandom => {
                let id = Uuid::new_v4().to_string();
                self.fetch(&id).await
            }
        };
        if let Err(err) = result {
            self.stats.errors += 1;
            error!(action = ?action, error = %err, "Traffic action failed");
        }
    }

    async fn create_then_get(&mut self) -> Result<(), BotError> {
        let new_user = self.synthetic_user();
        let user = self.client.create_user(&new_user).await?;
        self.stats.created += 1;
        info!(user_id = %user.id, name = %user.name, "Created user");

        let pause = self.pick(self.config.follow_up_delay_ms.clone());
        tokio::time::sleep(pause).await;
        self.fetch(&user.id).await
    }

    async fn fetch(&mut self, id: &str) -> Result<(), BotError> {
        match self.client.get_user(id).await? {
            Some(user) => {
                self.stats.fetched += 1;
                info!(user_id = %user.id, email = %user.email, "Retrieved user");
            }
            None => {
                self.stats.not_found += 1;
                warn!(user_id = %id, "User not found");
            }
        }
        Ok(())
    }

    fn synthetic_user(&mut self) -> NewUser {
        let first = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Test");
        let last = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("User");
        let suffix: u16 = self.rng.gen_range(1..10_000);
        NewUser {
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{suffix}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
        }
    }

    fn pick(&mut self, range: RangeInclusive<u64>) -> Duration {
        Duration::from_millis(self.rng.gen_range(range))
    }
}
