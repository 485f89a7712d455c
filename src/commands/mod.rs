// Command handlers module
pub mod add;
pub mod completions;
pub mod install;
pub mod search;
pub mod status;
pub mod sync;

use crate::core::{yt_dlp, Config, YtDlp};
use anyhow::{Context, Result};
use std::path::Path;

/// Load the config file; any failure here is fatal for the command
pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    Config::load(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))
}

/// yt-dlp client configured for remote lookups
pub(crate) fn yt_dlp_client(config: &Config) -> Result<YtDlp> {
    let path = yt_dlp::resolve(config).context("yt-dlp is required for remote lookups")?;
    Ok(YtDlp::new(path, config.sync.lookup_timeout()))
}
