use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a probe produced no samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The probe did not complete within the hard timeout
    Timeout,
    /// The network primitive reported the host could not be reached
    Unreachable,
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// One immutable probe result for a host.
///
/// `rtt` and `jitter` are milliseconds and only meaningful while `failed`
/// is false. The timestamp marks classification time, not dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub hostname: String,
    pub rtt: f64,
    pub jitter: f64,
    pub failed: bool,
    pub timestamp: DateTime<Utc>,
}

impl ProbeRecord {
    /// Classify a successful sample set: mean round-trip time and
    /// max-minus-min spread.
    pub fn success(hostname: impl Into<String>, samples: &[f64]) -> Self {
        let hostname = hostname.into();
        if samples.is_empty() {
            return Self::failure(hostname);
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self { hostname, rtt: mean, jitter: max - min, failed: false, timestamp: Utc::now() }
    }

    /// Classify a failed probe. Failures are data, not dropped events.
    pub fn failure(hostname: impl Into<String>) -> Self {
        Self { hostname: hostname.into(), rtt: 0.0, jitter: 0.0, failed: true, timestamp: Utc::now() }
    }

    /// Timestamp as unix milliseconds, the persisted representation.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Convert persisted unix milliseconds back into a UTC instant.
    pub fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_classification() {
        let record = ProbeRecord::success("example.com", &[10.0, 12.0, 11.0, 9.0, 13.0]);
        assert!(!record.failed);
        assert_eq!(record.rtt, 11.0);
        assert_eq!(record.jitter, 4.0);
        assert_eq!(record.hostname, "example.com");
    }

    #[test]
    fn test_single_sample_has_zero_jitter() {
        let record = ProbeRecord::success("example.com", &[7.5]);
        assert!(!record.failed);
        assert_eq!(record.rtt, 7.5);
        assert_eq!(record.jitter, 0.0);
    }

    #[test]
    fn test_failure_classification() {
        let record = ProbeRecord::failure("example.com");
        assert!(record.failed);
        assert_eq!(record.rtt, 0.0);
        assert_eq!(record.jitter, 0.0);
    }

    #[test]
    fn test_empty_sample_set_is_a_failure() {
        let record = ProbeRecord::success("example.com", &[]);
        assert!(record.failed);
    }

    #[test]
    fn test_millis_round_trip() {
        let record = ProbeRecord::failure("example.com");
        let restored = ProbeRecord::millis_to_timestamp(record.timestamp_millis());
        assert_eq!(restored.timestamp_millis(), record.timestamp_millis());
    }
}
