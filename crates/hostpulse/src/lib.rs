//! hostpulse - reachability and latency monitoring engine
//!
//! This library provides the probing core shared by the monitoring daemon
//! and the HTTP API: latency probes, probe classification, the periodic
//! fan-out scheduler, and the append-only result store.

pub mod config;
pub mod pool;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod validation;

// Re-export main types
pub use probe::{PingProber, ProbeConfig, Prober};
pub use registry::{HostRegistry, LibsqlRegistry, RegisterError, register_host};
pub use scheduler::{RunSummary, Scheduler, SchedulerConfig};
pub use store::{LibsqlStore, ResultStore};
pub use types::{ProbeFailure, ProbeRecord};

/// Re-export common error types
pub use anyhow;

/// hostpulse result type using anyhow for error handling
pub type Result<T> = anyhow::Result<T>;
