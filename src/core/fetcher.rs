//! Fetching videos through an external downloader command
//!
//! The command is an argument vector from the config. Each argument is templated
//! with `{video_id}`, `{channel_name}`, `{output_path}` and any extra scalar key of
//! the downloader block. No shell is involved, so channel names and ids are never
//! interpreted.

use crate::core::config::{Channel, Config};
use crate::core::process::{self, ProcessError};
use crate::core::video::VideoId;
use crate::error::{ArchiverError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Program name that is swapped for the resolved yt-dlp binary
const YT_DLP_PROGRAM: &str = "yt-dlp";

/// Executes a download for one video
pub trait Downloader: Send + Sync {
    /// Download `video_id` into the channel directory
    ///
    /// Success only means the command exited zero; the file is verified by the
    /// next scan.
    fn fetch(&self, channel: &Channel, video_id: &VideoId) -> Result<()>;
}

/// Replace `{key}` tokens in `template`; unknown keys are left as written
pub fn render_template(template: &str, params: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

/// [`Downloader`] that runs the configured command template
#[derive(Debug, Clone)]
pub struct CommandDownloader {
    template: Vec<String>,
    params: BTreeMap<String, String>,
    yt_dlp: Option<PathBuf>,
    timeout: Duration,
}

impl CommandDownloader {
    pub fn new(template: Vec<String>, output_root: &Path, timeout: Duration) -> Self {
        let mut params = BTreeMap::new();
        params.insert(
            "output_path".to_string(),
            output_root.to_string_lossy().to_string(),
        );
        Self {
            template,
            params,
            yt_dlp: None,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut downloader = Self::new(
            config.downloader.command.clone(),
            &config.output_root(),
            config.sync.download_timeout(),
        );
        for (key, value) in &config.downloader.params {
            match scalar_to_string(value) {
                Some(s) => {
                    downloader.params.insert(key.clone(), s);
                }
                None => log::debug!("Downloader parameter '{}' is not a scalar, skipping", key),
            }
        }
        downloader
    }

    /// Use `path` whenever the template names the program `yt-dlp`
    pub fn with_yt_dlp(mut self, path: Option<PathBuf>) -> Self {
        self.yt_dlp = path;
        self
    }

    /// The argument vector for one video, program first
    pub fn render_args(&self, channel: &Channel, video_id: &VideoId) -> Vec<String> {
        let mut params = self.params.clone();
        params.insert("video_id".to_string(), video_id.to_string());
        params.insert("channel_name".to_string(), channel.name.clone());

        self.template
            .iter()
            .map(|arg| render_template(arg, &params))
            .collect()
    }

    fn build_command(&self, args: &[String]) -> Option<Command> {
        let (program, rest) = args.split_first()?;
        let mut cmd = match (&self.yt_dlp, program.as_str()) {
            (Some(path), YT_DLP_PROGRAM) => Command::new(path),
            _ => Command::new(program),
        };
        cmd.args(rest);
        Some(cmd)
    }
}

impl Downloader for CommandDownloader {
    fn fetch(&self, channel: &Channel, video_id: &VideoId) -> Result<()> {
        let args = self.render_args(channel, video_id);
        let mut cmd = self
            .build_command(&args)
            .ok_or_else(|| ArchiverError::download(video_id.as_str(), "downloader command is empty"))?;

        log::info!("Downloading {} for {}", video_id, channel.name);

        let status = process::run_with_timeout(&mut cmd, self.timeout).map_err(|e| match e {
            ProcessError::TimedOut(after) => {
                ArchiverError::download(video_id.as_str(), format!("timed out after {:?}", after))
            }
            other => ArchiverError::download(video_id.as_str(), other.to_string()),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ArchiverError::download(
                video_id.as_str(),
                format!("downloader exited with {}", status),
            ))
        }
    }
}
