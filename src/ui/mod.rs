// UI and formatting module

pub mod formatters;
pub mod messages;
pub mod table;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_downloads, format_size};
pub use messages::{error, info, success, warn};
pub use table::Table;
