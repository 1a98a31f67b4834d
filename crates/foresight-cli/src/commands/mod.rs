//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared session setup (history, config, reference time)
//! - `reports` - One command per analysis, plus the full report

pub mod core;
pub mod reports;

// Re-export command functions for main.rs
pub use self::core::*;
pub use self::reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
