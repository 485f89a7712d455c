//! YAML configuration: tracked channels, downloader settings and sync tuning
//!
//! The file is loaded once at start-up into an immutable [`Config`]. Mutations go
//! through [`crate::core::ChannelStore`], which writes a new file atomically.

use crate::core::validation;
use crate::error::{ArchiverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.yt-archiver.yaml";

/// A tracked channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub id: String,
    /// Number of newest uploads to retain; `None` keeps everything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<NonZeroUsize>,
}

impl Channel {
    pub fn new<N: Into<String>, I: Into<String>>(
        name: N,
        id: I,
        keep: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            keep,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_channel_name(&self.name)?;
        validation::validate_channel_id(&self.id)
    }

    /// Local directory holding this channel's downloads
    pub fn directory(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.name)
    }
}

/// Settings for the external downloader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloaderSettings {
    pub output_path: String,
    /// Argument vector; each element may contain `{placeholder}` tokens
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Extra scalar parameters, available as `{key}` in `command`
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

fn default_command() -> Vec<String> {
    vec![
        "yt-dlp".to_string(),
        "--no-progress".to_string(),
        "-o".to_string(),
        "{output_path}/{channel_name}/%(title)s [%(id)s].%(ext)s".to_string(),
        "https://www.youtube.com/watch?v={video_id}".to_string(),
    ]
}

impl DownloaderSettings {
    pub fn new<S: Into<String>>(output_path: S) -> Self {
        Self {
            output_path: output_path.into(),
            command: default_command(),
            params: BTreeMap::new(),
        }
    }

    /// Output root with a leading `~` expanded
    pub fn output_root(&self) -> PathBuf {
        expand_tilde(&self.output_path)
    }
}

/// Tuning knobs for `sync`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Channels synced concurrently
    pub jobs: usize,
    pub lookup_timeout_secs: u64,
    pub download_timeout_secs: u64,
    /// Skip purging when the remote window is empty but local videos exist
    pub protect_on_empty_remote: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            jobs: 1,
            lookup_timeout_secs: 120,
            download_timeout_secs: 3600,
            protect_on_empty_remote: false,
        }
    }
}

impl SyncSettings {
    fn is_default(&self) -> bool {
        *self == SyncSettings::default()
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub channels: Vec<Channel>,
    pub downloader: DownloaderSettings,
    #[serde(default, skip_serializing_if = "SyncSettings::is_default")]
    pub sync: SyncSettings,
    /// Explicit yt-dlp binary; otherwise PATH and the managed install are searched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_dlp_path: Option<PathBuf>,
    /// Unrecognised top-level keys, written back untouched on save
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Config {
    pub fn new(downloader: DownloaderSettings) -> Self {
        Self {
            channels: Vec::new(),
            downloader,
            sync: SyncSettings::default(),
            yt_dlp_path: None,
            extra: BTreeMap::new(),
        }
    }

    /// Load and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {:?}", path);

        let text = fs::read_to_string(path).map_err(|e| {
            ArchiverError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::parse(&text)
    }

    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.downloader.output_path.trim().is_empty() {
            return Err(ArchiverError::config("downloader.output_path cannot be empty"));
        }
        if self.downloader.command.is_empty() {
            return Err(ArchiverError::config("downloader.command cannot be empty"));
        }
        if self.sync.jobs == 0 {
            return Err(ArchiverError::config("sync.jobs must be at least 1"));
        }
        // Channel records are validated per channel by `sync` and `add`
        Ok(())
    }

    /// Write the configuration atomically: a sibling temp file renamed over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ArchiverError::Io(e.error))?;

        log::debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn find_channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn output_root(&self) -> PathBuf {
        self.downloader.output_root()
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
