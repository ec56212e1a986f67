//! Terminal styling for help output and resource listings.
//!
//! Colors for statuses and log levels live here rather than on the core enums.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use console::{style, StyledObject};
use containu_core::models::{ContainerStatus, LogLevel};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Styling helpers for strings shown in help and error messages.
pub trait AnsiStyles {
    /// Styles a literal such as a flag or command name.
    fn literal(&self) -> String;

    /// Styles a placeholder such as `<NAME>`.
    fn placeholder(&self) -> String;

    /// Styles a section header.
    fn header(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the clap styles used by every containu command.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Styles a container status for listings.
pub fn status_style(status: ContainerStatus) -> StyledObject<&'static str> {
    let styled = style(status.as_str());
    match status {
        ContainerStatus::Running => styled.green(),
        ContainerStatus::Stopped => styled.dim(),
        ContainerStatus::Error => styled.red().bold(),
        ContainerStatus::Pulling => styled.yellow(),
    }
}

/// Styles a log level tag.
pub fn level_style(level: LogLevel) -> StyledObject<&'static str> {
    let styled = style(level.as_str());
    match level {
        LogLevel::Info => styled.blue(),
        LogLevel::Warning => styled.yellow(),
        LogLevel::Error => styled.red().bold(),
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<T: AsRef<str>> AnsiStyles for T {
    fn literal(&self) -> String {
        style(self.as_ref()).green().bold().to_string()
    }

    fn placeholder(&self) -> String {
        style(self.as_ref()).cyan().to_string()
    }

    fn header(&self) -> String {
        style(self.as_ref()).yellow().bold().to_string()
    }
}
