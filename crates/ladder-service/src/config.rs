//! Service configuration.
//!
//! Provides [`ServiceConfig`] with defaults for the batch cadence, HTTP bind
//! address and log filter. Binaries fill it from command-line arguments.

use std::time::Duration;

use ladder_core::constants::DEFAULT_BATCH_INTERVAL;

/// Shortest accepted batch interval; tokio intervals cannot have a zero period.
pub const MIN_BATCH_INTERVAL: Duration = Duration::from_millis(1);

/// Default HTTP bind address for the server binary.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Configuration for a ranking service instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Cadence of the batch applier.
    pub batch_interval: Duration,
    /// Socket address the HTTP layer binds to.
    pub bind_addr: String,
    /// Log level filter string (e.g. "info", "ladder_service=debug").
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            batch_interval: DEFAULT_BATCH_INTERVAL,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Replace the batch interval, clamped to [`MIN_BATCH_INTERVAL`].
    pub fn with_batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval.max(MIN_BATCH_INTERVAL);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_one_second() {
        assert_eq!(ServiceConfig::default().batch_interval, Duration::from_secs(1));
    }

    #[test]
    fn default_bind_is_localhost() {
        assert_eq!(ServiceConfig::default().bind_addr, "127.0.0.1:5000");
    }

    #[test]
    fn default_log_level_is_info() {
        assert_eq!(ServiceConfig::default().log_level, "info");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = ServiceConfig::default().with_batch_interval(Duration::ZERO);
        assert_eq!(cfg.batch_interval, MIN_BATCH_INTERVAL);
    }

    #[test]
    fn custom_interval_is_kept() {
        let cfg = ServiceConfig::default().with_batch_interval(Duration::from_millis(250));
        assert_eq!(cfg.batch_interval, Duration::from_millis(250));
    }
}
