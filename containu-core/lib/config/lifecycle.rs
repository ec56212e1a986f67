//! Tunables for the simulated lifecycle layer.
//!
//! Every value has a default and can be overridden through a `CONTAINU_*` environment variable.

use std::{env, str::FromStr, time::Duration};

use containu_utils::{
    DEFAULT_LATENCY_MS, DEFAULT_LOG_CAPACITY, DEFAULT_LOG_STREAM_COUNT, DEFAULT_METRIC_CAPACITY,
    DEFAULT_RESTART_PAUSE_MS, DEFAULT_STATS_STREAM_COUNT, DEFAULT_STREAM_INTERVAL_MS,
    FAILURE_RATE_ENV_VAR, LATENCY_MS_ENV_VAR, LOG_CAPACITY_ENV_VAR, LOG_STREAM_COUNT_ENV_VAR,
    METRIC_CAPACITY_ENV_VAR, RESTART_PAUSE_MS_ENV_VAR, STATS_STREAM_COUNT_ENV_VAR,
    STREAM_INTERVAL_MS_ENV_VAR,
};
use getset::CopyGetters;
use typed_builder::TypedBuilder;

use crate::{ContainuError, ContainuResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration for the lifecycle service, its streams and the store's buffers.
#[derive(Debug, Clone, CopyGetters, TypedBuilder)]
#[getset(get_copy = "pub with_prefix")]
pub struct LifecycleConfig {
    /// Simulated round trip of each lifecycle operation
    #[builder(default = Duration::from_millis(DEFAULT_LATENCY_MS))]
    latency: Duration,

    /// Pause between the stop and start halves of a restart
    #[builder(default = Duration::from_millis(DEFAULT_RESTART_PAUSE_MS))]
    restart_pause: Duration,

    /// Spacing between items of a log or stats stream
    #[builder(default = Duration::from_millis(DEFAULT_STREAM_INTERVAL_MS))]
    stream_interval: Duration,

    /// Number of entries a log stream emits
    #[builder(default = DEFAULT_LOG_STREAM_COUNT)]
    log_stream_count: usize,

    /// Number of samples a stats stream emits
    #[builder(default = DEFAULT_STATS_STREAM_COUNT)]
    stats_stream_count: usize,

    /// Metric samples kept per container
    #[builder(default = DEFAULT_METRIC_CAPACITY)]
    metric_capacity: usize,

    /// Log entries kept per container
    #[builder(default = DEFAULT_LOG_CAPACITY)]
    log_capacity: usize,

    /// Probability that a start or stop fails
    #[builder(default = 0.0)]
    failure_rate: f64,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LifecycleConfig {
    /// Creates a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CONTAINU_LATENCY_MS`: Simulated operation latency (default: 200)
    /// - `CONTAINU_RESTART_PAUSE_MS`: Pause inside a restart (default: 200)
    /// - `CONTAINU_STREAM_INTERVAL_MS`: Stream pacing (default: 1000)
    /// - `CONTAINU_LOG_STREAM_COUNT`: Entries per log stream (default: 20)
    /// - `CONTAINU_STATS_STREAM_COUNT`: Samples per stats stream (default: 60)
    /// - `CONTAINU_METRIC_CAPACITY`: Metric samples kept per container (default: 60)
    /// - `CONTAINU_LOG_CAPACITY`: Log entries kept per container (default: 1000)
    /// - `CONTAINU_FAILURE_RATE`: Probability that a start or stop fails (default: 0.0)
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> ContainuResult<Self> {
        let config = Self {
            latency: Duration::from_millis(parse_var(LATENCY_MS_ENV_VAR, DEFAULT_LATENCY_MS)),
            restart_pause: Duration::from_millis(parse_var(
                RESTART_PAUSE_MS_ENV_VAR,
                DEFAULT_RESTART_PAUSE_MS,
            )),
            stream_interval: Duration::from_millis(parse_var(
                STREAM_INTERVAL_MS_ENV_VAR,
                DEFAULT_STREAM_INTERVAL_MS,
            )),
            log_stream_count: parse_var(LOG_STREAM_COUNT_ENV_VAR, DEFAULT_LOG_STREAM_COUNT),
            stats_stream_count: parse_var(STATS_STREAM_COUNT_ENV_VAR, DEFAULT_STATS_STREAM_COUNT),
            metric_capacity: parse_var(METRIC_CAPACITY_ENV_VAR, DEFAULT_METRIC_CAPACITY),
            log_capacity: parse_var(LOG_CAPACITY_ENV_VAR, DEFAULT_LOG_CAPACITY),
            failure_rate: parse_var(FAILURE_RATE_ENV_VAR, 0.0),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ContainuResult<()> {
        if self.metric_capacity == 0 || self.log_capacity == 0 {
            return Err(ContainuError::Config(format!(
                "buffer capacities must be positive, got metrics={} logs={}",
                self.metric_capacity, self.log_capacity
            )));
        }

        if self.log_stream_count == 0 || self.stats_stream_count == 0 {
            return Err(ContainuError::Config(format!(
                "stream counts must be positive, got logs={} stats={}",
                self.log_stream_count, self.stats_stream_count
            )));
        }

        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ContainuError::Config(format!(
                "failure rate must be between 0 and 1, got: {}",
                self.failure_rate
            )));
        }

        Ok(())
    }

    /// Returns a copy of this configuration with a different latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for var in [
            LATENCY_MS_ENV_VAR,
            RESTART_PAUSE_MS_ENV_VAR,
            STREAM_INTERVAL_MS_ENV_VAR,
            LOG_STREAM_COUNT_ENV_VAR,
            STATS_STREAM_COUNT_ENV_VAR,
            METRIC_CAPACITY_ENV_VAR,
            LOG_CAPACITY_ENV_VAR,
            FAILURE_RATE_ENV_VAR,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = LifecycleConfig::default();

        assert_eq!(config.get_latency(), Duration::from_millis(200));
        assert_eq!(config.get_stream_interval(), Duration::from_secs(1));
        assert_eq!(config.get_log_stream_count(), 20);
        assert_eq!(config.get_stats_stream_count(), 60);
        assert_eq!(config.get_metric_capacity(), 60);
        assert_eq!(config.get_failure_rate(), 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_and_fallbacks() {
        clear_env();
        std::env::set_var(LATENCY_MS_ENV_VAR, "5");
        std::env::set_var(LOG_CAPACITY_ENV_VAR, "not-a-number");

        let config = LifecycleConfig::from_env().unwrap();
        assert_eq!(config.get_latency(), Duration::from_millis(5));
        assert_eq!(config.get_log_capacity(), DEFAULT_LOG_CAPACITY);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_failure_rate() {
        clear_env();
        std::env::set_var(FAILURE_RATE_ENV_VAR, "1.5");

        let result = LifecycleConfig::from_env();
        assert!(matches!(result, Err(ContainuError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = LifecycleConfig::builder().metric_capacity(0).build();
        assert!(config.validate().is_err());
    }
}
