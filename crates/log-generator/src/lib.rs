//! Synthetic log traffic for the log pipeline.
//!
//! Four simulated services (users, orders, products, payments) each produce
//! a stream of business events with labels, a duration and a status code.
//! A single shipper writes them to Logstash's TCP input as newline-delimited
//! JSON, connecting with bounded retries and reconnecting once per failed
//! write.

pub mod args;
pub mod event;
pub mod generator;
pub mod shipper;
pub mod simulators;

pub use args::Args;
pub use event::{EventLevel, Labels, LogEvent};
pub use generator::{run, GeneratorConfig, GeneratorStats};
pub use shipper::{connect_with_retries, ConnectPolicy, GeneratorError, LogstashShipper};
pub use simulators::{ServiceSimulator, SimulatedService};
