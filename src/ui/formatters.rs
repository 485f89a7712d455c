use humansize::{format_size as human_format_size, DECIMAL};
use std::num::NonZeroUsize;

/// Format a byte count in human-readable decimal units
pub fn format_size(size: u64) -> String {
    human_format_size(size, DECIMAL)
}

/// `count` alone, or `count/keep` when the channel has a retention bound
pub fn format_downloads(count: usize, keep: Option<NonZeroUsize>) -> String {
    match keep {
        Some(keep) => format!("{}/{}", count, keep),
        None => count.to_string(),
    }
}
