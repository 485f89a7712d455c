// Validation for values that end up in filesystem paths or remote URLs

use crate::error::{ArchiverError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum channel name length (single path component on most filesystems)
const MAX_NAME_LENGTH: usize = 255;

static CHANNEL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("channel id pattern is valid"));

/// Validates a channel display name, which is used verbatim as a directory name
///
/// Rejects:
/// - Empty or whitespace-only names
/// - `.` and `..`
/// - Path separators and null bytes
/// - Names longer than a path component may be
pub fn validate_channel_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ArchiverError::invalid_channel("channel name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(ArchiverError::invalid_channel(format!(
            "channel name '{}' is not a usable directory name",
            name
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ArchiverError::invalid_channel(format!(
            "channel name '{}' contains a path separator",
            name
        )));
    }
    if name.contains('\0') {
        return Err(ArchiverError::invalid_channel(
            "channel name contains null byte",
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ArchiverError::invalid_channel(format!(
            "channel name is too long ({} bytes, max {})",
            name.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validates a remote channel id before it is placed in a feed URL
pub fn validate_channel_id(id: &str) -> Result<()> {
    if CHANNEL_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(ArchiverError::invalid_channel(format!(
            "channel id '{}' must only contain letters, digits, '_' or '-'",
            id
        )))
    }
}
