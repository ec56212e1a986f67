//! Environment variable names recognised by containu.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Environment variable for the simulated operation latency in milliseconds
pub const LATENCY_MS_ENV_VAR: &str = "CONTAINU_LATENCY_MS";

/// Environment variable for the restart pause in milliseconds
pub const RESTART_PAUSE_MS_ENV_VAR: &str = "CONTAINU_RESTART_PAUSE_MS";

/// Environment variable for the stream pacing interval in milliseconds
pub const STREAM_INTERVAL_MS_ENV_VAR: &str = "CONTAINU_STREAM_INTERVAL_MS";

/// Environment variable for the number of entries in a log stream
pub const LOG_STREAM_COUNT_ENV_VAR: &str = "CONTAINU_LOG_STREAM_COUNT";

/// Environment variable for the number of samples in a stats stream
pub const STATS_STREAM_COUNT_ENV_VAR: &str = "CONTAINU_STATS_STREAM_COUNT";

/// Environment variable for the per-container metric buffer size
pub const METRIC_CAPACITY_ENV_VAR: &str = "CONTAINU_METRIC_CAPACITY";

/// Environment variable for the per-container log buffer size
pub const LOG_CAPACITY_ENV_VAR: &str = "CONTAINU_LOG_CAPACITY";

/// Environment variable for the simulated failure probability of start/stop
pub const FAILURE_RATE_ENV_VAR: &str = "CONTAINU_FAILURE_RATE";
