//! Runtime configuration with sensible defaults.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
// (none)

/// Default envelopes processed per scheduling run before yielding.
pub const DEFAULT_THROUGHPUT_PER_RUN: usize = 16;

/// Default timeout for graceful system shutdown (30 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a single actor stop.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum concurrent actors (0 = unlimited).
pub const DEFAULT_MAX_ACTORS: usize = 0;

/// Configuration of one process-local actor runtime.
///
/// # Examples
///
/// ```rust
/// use actormesh_rt::system::config::{RuntimeConfig, DEFAULT_THROUGHPUT_PER_RUN};
///
/// let config = RuntimeConfig::default();
/// assert_eq!(config.throughput_per_run, DEFAULT_THROUGHPUT_PER_RUN);
///
/// let config = RuntimeConfig::default().with_throughput_per_run(4);
/// assert_eq!(config.throughput_per_run, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Envelopes one actor may process per scheduling run before yielding.
    /// Bounds how long a busy actor can hold a worker.
    pub throughput_per_run: usize,

    /// Mailbox capacity; `None` is the default unbounded FIFO.
    pub mailbox_capacity: Option<usize>,

    /// Worker threads for the runtime the binary builds; `None` uses the
    /// core count.
    pub worker_threads: Option<usize>,

    /// Timeout for graceful system shutdown.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,

    /// Timeout for stopping a single actor.
    #[serde(with = "duration_secs")]
    pub stop_timeout: Duration,

    /// Maximum concurrent actors (0 = unlimited).
    pub max_actors: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            throughput_per_run: DEFAULT_THROUGHPUT_PER_RUN,
            mailbox_capacity: None,
            worker_threads: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            max_actors: DEFAULT_MAX_ACTORS,
        }
    }
}

impl RuntimeConfig {
    /// Builder method: envelopes per scheduling run.
    pub fn with_throughput_per_run(mut self, throughput: usize) -> Self {
        self.throughput_per_run = throughput;
        self
    }

    /// Builder method: bounded mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    /// Builder method: worker thread count.
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    /// Builder method: actor limit.
    pub fn with_max_actors(mut self, max_actors: usize) -> Self {
        self.max_actors = max_actors;
        self
    }

    /// Effective worker thread count.
    pub fn effective_workers(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.throughput_per_run == 0 {
            return Err("throughput_per_run must be > 0".to_owned());
        }
        if self.mailbox_capacity == Some(0) {
            return Err("mailbox_capacity must be > 0 when bounded".to_owned());
        }
        if self.shutdown_timeout.is_zero() {
            return Err("shutdown_timeout must be > 0".to_owned());
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.throughput_per_run, DEFAULT_THROUGHPUT_PER_RUN);
        assert!(config.mailbox_capacity.is_none());
    }

    #[test]
    fn test_zero_throughput_rejected() {
        let config = RuntimeConfig::default().with_throughput_per_run(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_bounded_capacity_rejected() {
        let config = RuntimeConfig::default().with_mailbox_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_workers_floor() {
        let config = RuntimeConfig::default().with_worker_threads(4);
        assert_eq!(config.effective_workers(), 4);

        let config = RuntimeConfig::default();
        assert!(config.effective_workers() >= 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RuntimeConfig::default().with_mailbox_capacity(100);
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.mailbox_capacity, Some(100));
        assert_eq!(back.shutdown_timeout, config.shutdown_timeout);
    }
}
