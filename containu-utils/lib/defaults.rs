//! Default values shared across the containu crates.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Simulated round-trip latency of a lifecycle operation, in milliseconds.
pub const DEFAULT_LATENCY_MS: u64 = 200;

/// Pause between the stop and start halves of a restart, in milliseconds.
pub const DEFAULT_RESTART_PAUSE_MS: u64 = 200;

/// Spacing between two items of a log or stats stream, in milliseconds.
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 1000;

/// Number of entries a log stream emits before finishing.
pub const DEFAULT_LOG_STREAM_COUNT: usize = 20;

/// Number of samples a stats stream emits before finishing.
pub const DEFAULT_STATS_STREAM_COUNT: usize = 60;

/// Maximum number of metric samples kept per container.
pub const DEFAULT_METRIC_CAPACITY: usize = 60;

/// Maximum number of log entries kept per container.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Default number of log entries returned by a log fetch.
pub const DEFAULT_LOG_TAIL: usize = 100;

/// Number of entries used to backfill an empty log buffer on fetch.
pub const LOG_BACKLOG_SIZE: usize = 50;

/// Default driver for new networks.
pub const DEFAULT_NETWORK_DRIVER: &str = "bridge";

/// Default driver for new volumes.
pub const DEFAULT_VOLUME_DRIVER: &str = "local";

/// Default tag used when pulling an image without one.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Names of the networks that ship with every engine and cannot be removed.
pub const BUILTIN_NETWORKS: [&str; 3] = ["bridge", "host", "none"];
