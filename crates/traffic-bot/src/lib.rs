//! Synthetic traffic generator for the user service.
//!
//! Each iteration sleeps for a random delay and then either creates a user
//! and reads it back, or asks for a random id that almost certainly does not
//! exist. Outcomes are logged through `tracing` and tallied in [`BotStats`].

pub mod args;
pub mod bot;
pub mod client;

pub use args::Args;
pub use bot::{Action, BotConfig, BotStats, TrafficBot};
pub use client::{BotError, UserClient};
