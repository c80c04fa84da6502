//! Latency probes.
//!
//! A probe issues one reachability measurement against a single host and
//! returns the observed round-trip delays or a failure classification. It
//! has no side effects beyond the network traffic it generates.

pub mod ping;

use std::time::Duration;

use crate::types::ProbeFailure;

pub use ping::PingProber;

/// How a single probe sequence is shaped
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Echo requests per probe
    pub samples: u32,
    /// Spacing between echo requests
    pub interval: Duration,
    /// Hard deadline for the whole sequence, measured from dispatch
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            samples: 5,
            interval: Duration::from_millis(200),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Prober trait for reachability measurements against one host
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe the host, returning round-trip delay samples in milliseconds
    async fn probe(&self, host: &str) -> Result<Vec<f64>, ProbeFailure>;
}
