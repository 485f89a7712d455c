use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for yt-archiver
#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The feed service was unreachable, timed out, or rejected the channel id.
    #[error("Remote lookup failed for channel '{channel_id}': {reason}")]
    RemoteLookup { channel_id: String, reason: String },

    /// The external downloader exited non-zero, timed out, or could not be spawned.
    #[error("Download of video '{video_id}' failed: {reason}")]
    Download { video_id: String, reason: String },

    #[error("Failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Channel ID '{0}' already in archive")]
    DuplicateChannel(String),

    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Install error: {0}")]
    Install(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for yt-archiver
pub type Result<T> = std::result::Result<T, ArchiverError>;

impl ArchiverError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ArchiverError::Config(msg.into())
    }

    /// Create a remote lookup error for `channel_id`
    pub fn remote_lookup<C: Into<String>, S: Into<String>>(channel_id: C, reason: S) -> Self {
        ArchiverError::RemoteLookup {
            channel_id: channel_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a download error for `video_id`
    pub fn download<V: Into<String>, S: Into<String>>(video_id: V, reason: S) -> Self {
        ArchiverError::Download {
            video_id: video_id.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_channel<S: Into<String>>(msg: S) -> Self {
        ArchiverError::InvalidChannel(msg.into())
    }

    pub fn install<S: Into<String>>(msg: S) -> Self {
        ArchiverError::Install(msg.into())
    }

    pub fn process<S: Into<String>>(msg: S) -> Self {
        ArchiverError::Process(msg.into())
    }
}
