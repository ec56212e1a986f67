use clap::{Parser, Subcommand};
use containu_core::{models::LogLevel, view::SortOption};
use containu_utils::{DEFAULT_IMAGE_TAG, DEFAULT_LOG_TAIL, DEFAULT_NETWORK_DRIVER, DEFAULT_VOLUME_DRIVER};

use crate::styles;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// containu is an in-memory container engine simulator.
///
/// Every invocation seeds a fresh engine from the demo catalog, runs one command and exits.
#[derive(Debug, Parser)]
#[command(name = "containu", author, styles=styles::styles())]
pub struct ContainuArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<ContainuSubcommand>,

    /// Show version
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Simulated latency of each operation in milliseconds
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,

    /// Show logs with error level
    #[arg(long, global = true)]
    pub error: bool,

    /// Show logs with warn level
    #[arg(long, global = true)]
    pub warn: bool,

    /// Show logs with info level
    #[arg(long, global = true)]
    pub info: bool,

    /// Show logs with debug level
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show logs with trace level
    #[arg(long, global = true)]
    pub trace: bool,
}

/// Available subcommands for containu
#[derive(Debug, Subcommand)]
pub enum ContainuSubcommand {
    /// List containers
    #[command(name = "ps")]
    Ps {
        /// Only show containers whose name or image contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Sort by name, status or uptime
        #[arg(short, long, default_value_t = SortOption::Name)]
        sort: SortOption,
    },

    /// Show one container
    #[command(name = "inspect")]
    Inspect {
        /// Name or id of the container
        name: String,
    },

    /// Create a stopped container
    #[command(name = "create")]
    Create {
        /// Name of the container
        name: String,

        /// Image reference, e.g. nginx:latest
        image: String,

        /// Port mappings as host:container
        #[arg(short, long = "port")]
        ports: Vec<String>,

        /// Networks to attach
        #[arg(short, long = "network")]
        networks: Vec<String>,

        /// Volumes to attach
        #[arg(short, long = "volume")]
        volumes: Vec<String>,

        /// Start the container once it is created
        #[arg(long)]
        start: bool,
    },

    /// Start one or more containers
    #[command(name = "start")]
    Start {
        /// Names or ids of the containers
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Stop one or more containers
    #[command(name = "stop")]
    Stop {
        /// Names or ids of the containers
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Restart one or more containers
    #[command(name = "restart")]
    Restart {
        /// Names or ids of the containers
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Delete one or more containers
    #[command(name = "rm")]
    Rm {
        /// Names or ids of the containers
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the logs of a container
    #[command(name = "logs")]
    Logs {
        /// Name or id of the container
        name: String,

        /// Number of lines to show from the end of the log
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_TAIL)]
        tail: usize,

        /// Only show lines containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only show lines with these levels
        #[arg(short, long = "level")]
        levels: Vec<LogLevel>,

        /// Keep streaming new lines until interrupted
        #[arg(short, long)]
        follow: bool,
    },

    /// Show resource usage of a container
    #[command(name = "stats")]
    Stats {
        /// Name or id of the container
        name: String,

        /// Keep streaming samples until interrupted
        #[arg(short, long)]
        follow: bool,
    },

    /// Run a command inside a running container
    #[command(name = "exec")]
    Exec {
        /// Name or id of the container
        name: String,

        /// The command to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List images
    #[command(name = "images")]
    Images {
        /// Only show images whose repository or tag contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Pull an image
    #[command(name = "pull")]
    Pull {
        /// Image reference as repository[:tag]
        reference: String,
    },

    /// Remove an image
    #[command(name = "rmi")]
    Rmi {
        /// Image reference as repository:tag, or image id
        reference: String,
    },

    /// Manage networks
    #[command(name = "network")]
    Network {
        /// The network subcommand to run
        #[command(subcommand)]
        subcommand: NetworkSubcommand,
    },

    /// Manage volumes
    #[command(name = "volume")]
    Volume {
        /// The volume subcommand to run
        #[command(subcommand)]
        subcommand: VolumeSubcommand,
    },
}

/// Subcommands for managing networks
#[derive(Debug, Subcommand)]
pub enum NetworkSubcommand {
    /// List networks
    #[command(name = "ls")]
    Ls,

    /// Create a network
    #[command(name = "create")]
    Create {
        /// Name of the network
        name: String,

        /// Network driver
        #[arg(short, long, default_value = DEFAULT_NETWORK_DRIVER)]
        driver: String,
    },

    /// Remove a network
    #[command(name = "rm")]
    Rm {
        /// Name or id of the network
        name: String,
    },
}

/// Subcommands for managing volumes
#[derive(Debug, Subcommand)]
pub enum VolumeSubcommand {
    /// List volumes
    #[command(name = "ls")]
    Ls,

    /// Create a volume
    #[command(name = "create")]
    Create {
        /// Name of the volume
        name: String,

        /// Volume driver
        #[arg(short, long, default_value = DEFAULT_VOLUME_DRIVER)]
        driver: String,
    },

    /// Remove a volume
    #[command(name = "rm")]
    Rm {
        /// Name or id of the volume
        name: String,
    },
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Splits an image reference into repository and tag, defaulting the tag to `latest`.
///
/// A colon that belongs to a registry port (`localhost:5000/app`) is not treated as a tag
/// separator.
pub fn parse_image_reference(reference: &str) -> (String, String) {
    match reference.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') && !repository.is_empty() => {
            (repository.to_string(), tag.to_string())
        }
        _ => (reference.to_string(), DEFAULT_IMAGE_TAG.to_string()),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
