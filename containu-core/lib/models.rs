//! Resource types managed by the containu store.
//!
//! These carry no presentation data. Icons and colors for statuses and log levels belong to
//! whatever renders them.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Uptime shown for a container that is not running.
pub const UPTIME_IDLE: &str = "N/A";

/// Uptime shown for a container that was just started.
pub const UPTIME_JUST_STARTED: &str = "Just now";

/// Memory usage shown for a container that is not running.
pub const MEMORY_IDLE: &str = "0 MB";

/// Creation label of a freshly pulled image.
pub const CREATED_JUST_NOW: &str = "Just now";

/// Bounds of a CPU reading, in percent.
pub const CPU_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Bounds of a memory reading, in MB.
pub const MEMORY_RANGE: RangeInclusive<f64> = 50.0..=500.0;

/// Bounds of a combined network I/O reading, in MB/s.
pub const NETWORK_IO_RANGE: RangeInclusive<f64> = 0.0..=25.0;

//--------------------------------------------------------------------------------------------------
// Types: Common
//--------------------------------------------------------------------------------------------------

/// The kinds of resources held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A container
    Container,

    /// A container image
    Image,

    /// A network
    Network,

    /// A volume
    Volume,
}

//--------------------------------------------------------------------------------------------------
// Types: Container
//--------------------------------------------------------------------------------------------------

/// The lifecycle status of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerStatus {
    /// The image is being fetched
    Pulling,

    /// The container is running
    Running,

    /// The container exists but is not running
    Stopped,

    /// The last start or stop failed
    Error,
}

/// A container managed by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Container {
    /// Unique identifier, never reused
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    /// Name of the container
    #[builder(setter(into))]
    pub name: String,

    /// Image reference, e.g. `nginx:latest`
    #[builder(setter(into))]
    pub image: String,

    /// Current lifecycle status
    #[builder(default = ContainerStatus::Stopped)]
    pub status: ContainerStatus,

    /// Human readable uptime
    #[builder(default = UPTIME_IDLE.to_string(), setter(into))]
    pub uptime: String,

    /// CPU usage in percent
    #[builder(default)]
    pub cpu_usage: f64,

    /// Human readable memory usage
    #[builder(default = MEMORY_IDLE.to_string(), setter(into))]
    pub memory_usage: String,

    /// Port mappings as `host:container`
    #[builder(default)]
    pub ports: Vec<String>,

    /// Names of attached networks
    #[builder(default)]
    pub networks: Vec<String>,

    /// Names of attached volumes
    #[builder(default)]
    pub volumes: Vec<String>,
}

/// Parameters for creating a new container.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ContainerOptions {
    /// Name of the container
    #[builder(setter(into))]
    pub name: String,

    /// Image reference
    #[builder(setter(into))]
    pub image: String,

    /// Port mappings as `host:container`
    #[builder(default)]
    pub ports: Vec<String>,

    /// Names of networks to attach
    #[builder(default)]
    pub networks: Vec<String>,

    /// Names of volumes to attach
    #[builder(default)]
    pub volumes: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Types: Image, Network, Volume
//--------------------------------------------------------------------------------------------------

/// A container image available on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct ContainerImage {
    /// Unique identifier, never reused
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    /// Repository, e.g. `nginx`
    #[builder(setter(into))]
    pub repository: String,

    /// Tag, e.g. `latest`
    #[builder(setter(into))]
    pub tag: String,

    /// Human readable size
    #[builder(setter(into))]
    pub size: String,

    /// Human readable creation time
    #[builder(setter(into))]
    pub created: String,
}

/// A network containers can attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Network {
    /// Unique identifier, never reused
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    /// Name of the network
    #[builder(setter(into))]
    pub name: String,

    /// Network driver, e.g. `bridge`
    #[builder(setter(into))]
    pub driver: String,

    /// Subnet in CIDR notation, empty when not applicable
    #[builder(default, setter(into))]
    pub subnet: String,

    /// Scope, e.g. `local` or `swarm`
    #[builder(default = "local".to_string(), setter(into))]
    pub scope: String,

    /// Whether containers can be attached manually
    #[builder(default = true)]
    pub attachable: bool,

    /// Whether the network is isolated from the outside
    #[builder(default)]
    pub internal: bool,

    /// Ids of attached containers, for display only
    #[builder(default)]
    pub containers: Vec<Uuid>,
}

/// A named volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Volume {
    /// Unique identifier, never reused
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    /// Name of the volume
    #[builder(setter(into))]
    pub name: String,

    /// Volume driver, e.g. `local`
    #[builder(setter(into))]
    pub driver: String,

    /// Human readable size
    #[builder(default = "0 B".to_string(), setter(into))]
    pub size: String,

    /// Mount point on the host
    #[builder(setter(into))]
    pub mount_point: String,

    /// Ids of attached containers, for display only
    #[builder(default)]
    pub containers: Vec<Uuid>,
}

//--------------------------------------------------------------------------------------------------
// Types: Logs and Metrics
//--------------------------------------------------------------------------------------------------

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// Informational
    Info,

    /// Something looks wrong
    Warning,

    /// Something failed
    Error,
}

/// A single line in a container's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier
    pub id: Uuid,

    /// When the line was written
    pub timestamp: DateTime<Utc>,

    /// The message
    pub message: String,

    /// The severity
    pub level: LogLevel,
}

/// A point-in-time reading of a container's resource usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Unique identifier
    pub id: Uuid,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// CPU usage in percent
    pub cpu: f64,

    /// Memory usage in MB
    pub memory: f64,

    /// Combined network I/O in MB/s
    pub network_io: f64,
}

/// One of the series carried by a [`MetricSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// CPU usage in percent
    Cpu,

    /// Memory usage in MB
    Memory,

    /// Network I/O in MB/s
    NetworkIo,
}

/// A single value of one metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// When the value was recorded
    pub timestamp: DateTime<Utc>,

    /// The value
    pub value: f64,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ContainerStatus {
    /// Returns the raw value used for display and lexical sorting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pulling => "Pulling",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Error => "Error",
        }
    }
}

impl Container {
    /// Returns `true` if the container is running.
    pub fn is_running(&self) -> bool {
        self.status == ContainerStatus::Running
    }
}

impl ContainerImage {
    /// Returns the `repository:tag` reference of the image.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

impl Network {
    /// Returns `true` if this is one of the networks every engine ships with.
    pub fn is_builtin(&self) -> bool {
        containu_utils::BUILTIN_NETWORKS.contains(&self.name.as_str())
    }
}

impl LogLevel {
    /// Returns the raw value used for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl LogEntry {
    /// Creates a log entry stamped with the current time.
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self::at(Utc::now(), message, level)
    }

    /// Creates a log entry with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            message: message.into(),
            level,
        }
    }

    /// Creates an informational log entry stamped with the current time.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Info)
    }
}

impl MetricSample {
    /// Creates a sample with randomized readings within the usual bounds.
    pub fn random(timestamp: DateTime<Utc>) -> Self {
        let mut rng = rand::rng();
        Self {
            id: Uuid::new_v4(),
            timestamp,
            cpu: rng.random_range(CPU_RANGE),
            memory: rng.random_range(MEMORY_RANGE),
            network_io: rng.random_range(NETWORK_IO_RANGE),
        }
    }

    /// Returns the value of one series.
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu => self.cpu,
            MetricKind::Memory => self.memory,
            MetricKind::NetworkIo => self.network_io,
        }
    }

    /// Returns the value of one series as a timestamped point.
    pub fn point(&self, kind: MetricKind) -> MetricPoint {
        MetricPoint {
            timestamp: self.timestamp,
            value: self.value(kind),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Image => write!(f, "image"),
            Self::Network => write!(f, "network"),
            Self::Volume => write!(f, "volume"),
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "invalid log level: {}. Valid levels: info, warn, error",
                s
            )),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
