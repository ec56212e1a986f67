//! Terminal styling helpers shared by the CLI.

use std::sync::LazyLock;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// A green checkmark for successful steps.
pub static CHECKMARK: LazyLock<String> =
    LazyLock::new(|| format!("{}", console::style("✓").green()));

/// A red cross for failed steps.
pub static CROSSMARK: LazyLock<String> =
    LazyLock::new(|| format!("{}", console::style("✗").red()));
