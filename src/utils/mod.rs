//! Utility modules shared across the catalog
//!
//! - Vernacular: common-name alias splitting and display names

pub mod vernacular;

// Re-export commonly used functions
pub use vernacular::{get_display_name, split_aliases};
