//! TCP delivery to Logstash.

use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::event::LogEvent;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("cannot connect to Logstash at {addr} after {attempts} attempts: {source}")]
    Connect {
        addr: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to Logstash: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode log event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// Dial `addr`, sleeping `policy.delay` between failed attempts.
///
/// At least one attempt is always made.
pub async fn connect_with_retries(
    addr: &str,
    policy: ConnectPolicy,
) -> Result<TcpStream, GeneratorError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!(addr, attempt, "Connected to Logstash");
                return Ok(stream);
            }
            Err(source) if attempt >= attempts => {
                return Err(GeneratorError::Connect {
                    addr: addr.to_string(),
                    attempts,
                    source,
                });
            }
            Err(err) => {
                warn!(addr, attempt, error = %err, "Cannot connect to Logstash");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

/// Owns the connection. A failed write triggers one reconnect (with the
/// full retry policy) and one resend of the same line.
pub struct LogstashShipper {
    addr: String,
    policy: ConnectPolicy,
    stream: TcpStream,
    shipped: u64,
    reconnects: u64,
}

impl LogstashShipper {
    pub async fn connect(addr: impl Into<String>, policy: ConnectPolicy) -> Result<Self, GeneratorError> {
        let addr = addr.into();
        let stream = connect_with_retries(&addr, policy).await?;
        Ok(Self {
            addr,
            policy,
            stream,
            shipped: 0,
            reconnects: 0,
        })
    }

    pub async fn ship(&mut self, event: &LogEvent) -> Result<(), GeneratorError> {
        let line = event.to_line()?;

        if let Err(err) = self.stream.write_all(&line).await {
            warn!(addr = %self.addr, error = %err, "Logstash write failed, reconnecting");
            self.stream = connect_with_retries(&self.addr, self.policy).await?;
            self.reconnects += 1;
            self.stream.write_all(&line).await?;
        }
        self.shipped += 1;
        Ok(())
    }

    /// Flush and close the write half so the peer sees end of stream.
    pub async fn close(mut self) -> Result<(), GeneratorError> {
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        Ok(())
    }

    pub fn shipped(&self) -> u64 {
        self.shipped
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }
}
