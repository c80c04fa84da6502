use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ProbeConfig, Prober};
use crate::types::ProbeFailure;
use crate::validation::validate_hostname;

/// ICMP echo prober backed by the system `ping` binary.
///
/// The host is passed as a single argv element, never through a shell, and
/// is syntactically checked before the subprocess is spawned. The whole
/// sequence is killed once the hard timeout elapses.
pub struct PingProber {
    config: ProbeConfig,
}

impl PingProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    fn command(&self, host: &str) -> Command {
        let mut command = Command::new("ping");
        command
            .arg("-n")
            .arg("-c")
            .arg(self.config.samples.to_string())
            .arg("-i")
            .arg(format!("{}", self.config.interval.as_secs_f64()))
            .arg(host)
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl Prober for PingProber {
    async fn probe(&self, host: &str) -> Result<Vec<f64>, ProbeFailure> {
        // Registration already validates hosts; this guard keeps a raw
        // string from ever reaching the subprocess as anything but an
        // address.
        let validation = validate_hostname(host);
        if !validation.is_valid {
            warn!(host = %host, "refusing to probe syntactically invalid host");
            return Err(ProbeFailure::Unreachable);
        }

        let output = match timeout(self.config.timeout, self.command(host).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                debug!(host = %host, error = %err, "failed to spawn ping");
                return Err(ProbeFailure::Unreachable);
            }
            // kill_on_drop reaps the child when the output future is dropped
            Err(_elapsed) => return Err(ProbeFailure::Timeout),
        };

        if !output.status.success() {
            return Err(ProbeFailure::Unreachable);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let samples = parse_reply_times(&stdout);
        if samples.is_empty() {
            return Err(ProbeFailure::Unreachable);
        }

        Ok(samples)
    }
}

/// Extract per-reply `time=<ms>` values from ping output.
fn parse_reply_times(output: &str) -> Vec<f64> {
    let mut samples = Vec::new();

    for line in output.lines() {
        let Some(index) = line.find("time=") else {
            continue;
        };
        let value = line[index + 5..].split_whitespace().next().unwrap_or("");
        if let Ok(millis) = value.parse::<f64>() {
            samples.push(millis);
        }
    }

    samples
}
