use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::{Container, ContainerImage, LogEntry, LogLevel};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How the container list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Case-insensitive by name
    #[default]
    Name,

    /// Lexically by status raw value
    Status,

    /// Lexically by uptime string
    Uptime,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the containers to display for a search query and sort option.
///
/// A non-empty `query` keeps containers whose name or image contains it, ignoring case. The
/// result is then sorted stably, so ties keep their original relative order.
pub fn visible(containers: &[Container], query: &str, sort: SortOption) -> Vec<Container> {
    let query = query.to_lowercase();
    let mut result: Vec<Container> = containers
        .iter()
        .filter(|c| {
            query.is_empty()
                || c.name.to_lowercase().contains(&query)
                || c.image.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();

    match sort {
        SortOption::Name => result.sort_by_key(|c| c.name.to_lowercase()),
        SortOption::Status => result.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
        SortOption::Uptime => result.sort_by(|a, b| a.uptime.cmp(&b.uptime)),
    }

    result
}

/// Returns the images whose repository or tag contains `query`, ignoring case.
pub fn filter_images(images: &[ContainerImage], query: &str) -> Vec<ContainerImage> {
    let query = query.to_lowercase();
    images
        .iter()
        .filter(|i| {
            query.is_empty()
                || i.repository.to_lowercase().contains(&query)
                || i.tag.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Returns the log entries whose level is in `levels` and whose message contains `search`,
/// ignoring case.
pub fn filter_logs(entries: &[LogEntry], search: &str, levels: &HashSet<LogLevel>) -> Vec<LogEntry> {
    let search = search.to_lowercase();
    entries
        .iter()
        .filter(|e| levels.contains(&e.level))
        .filter(|e| search.is_empty() || e.message.to_lowercase().contains(&search))
        .cloned()
        .collect()
}

/// Returns every log level, for an unfiltered view.
pub fn all_levels() -> HashSet<LogLevel> {
    HashSet::from([LogLevel::Info, LogLevel::Warning, LogLevel::Error])
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Status => write!(f, "status"),
            Self::Uptime => write!(f, "uptime"),
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            "uptime" => Ok(Self::Uptime),
            _ => Err(format!(
                "invalid sort option: {}. Valid options: name, status, uptime",
                s
            )),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
