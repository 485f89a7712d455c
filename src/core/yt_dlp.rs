//! yt-dlp as the remote collaborator: channel feeds, channel search, and
//! installation of a managed binary.

use crate::core::config::Config;
use crate::core::process::{LineStream, ProcessError};
use crate::core::remote_lister::{FeedIter, FeedRecord, RemoteFeed};
use crate::core::search::{ChannelSearch, SearchIter, SearchResult};
use crate::core::video::VideoId;
use crate::error::{ArchiverError, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use url::Url;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com/";
const RELEASES_URL: &str = "https://github.com/yt-dlp/yt-dlp/releases";
/// `sp` value restricting YouTube search results to channels
const CHANNEL_FILTER: &str = "EgIQAg==";
const CHECKSUMS_ASSET: &str = "SHA2-256SUMS";

/// Release asset for the running platform
pub fn asset_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
        "yt-dlp_linux"
    } else if cfg!(all(target_os = "linux", target_arch = "aarch64")) {
        "yt-dlp_linux_aarch64"
    } else {
        // Python zipapp, needs a python3 interpreter
        "yt-dlp"
    }
}

/// Find the hash for `asset` in a `sha256sum`-style listing
pub fn parse_checksums(listing: &str, asset: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let hash = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        (name == asset).then(|| hash.to_lowercase())
    })
}

/// Where `install-yt-dlp` puts the binary
pub fn managed_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| ArchiverError::config("Could not determine data directory"))?;
    let file = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };
    Ok(data_dir.join("yt-archiver").join("bin").join(file))
}

/// Locate yt-dlp
///
/// Priority:
/// 1. `yt_dlp_path` from the config
/// 2. `yt-dlp` on the PATH
/// 3. The managed copy installed by `install-yt-dlp`
pub fn resolve(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.yt_dlp_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(ArchiverError::config(format!(
            "yt_dlp_path {:?} does not exist",
            path
        )));
    }

    if let Ok(path) = which::which("yt-dlp") {
        log::debug!("Using yt-dlp from PATH: {:?}", path);
        return Ok(path);
    }

    let managed = managed_path()?;
    if managed.exists() {
        log::debug!("Using managed yt-dlp: {:?}", managed);
        return Ok(managed);
    }

    Err(ArchiverError::config(
        "yt-dlp not found; install it or run 'yt-archiver install-yt-dlp'",
    ))
}

/// yt-dlp driven feed and search
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Self { path, timeout }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn json_lines(&self, url: &str, extra: &[String], context: &str) -> Result<JsonLines> {
        let mut cmd = Command::new(&self.path);
        cmd.args(["--flat-playlist", "--dump-json", "--no-warnings"])
            .args(extra)
            .arg(url);

        let stream = LineStream::spawn(&mut cmd, self.timeout)
            .map_err(|e| ArchiverError::remote_lookup(context, e.to_string()))?;
        Ok(JsonLines {
            stream,
            context: context.to_string(),
            done: false,
        })
    }
}

/// Iterator over the JSON records yt-dlp prints, one per line
///
/// A non-zero exit after the last line is reported as a final error item.
struct JsonLines {
    stream: LineStream,
    context: String,
    done: bool,
}

impl JsonLines {
    fn fail(&mut self, reason: String) -> Option<Result<serde_json::Value>> {
        self.done = true;
        self.stream.kill();
        Some(Err(ArchiverError::remote_lookup(self.context.as_str(), reason)))
    }
}

impl Iterator for JsonLines {
    type Item = Result<serde_json::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.stream.next_line() {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return match serde_json::from_str(&line) {
                        Ok(value) => Some(Ok(value)),
                        Err(e) => self.fail(format!("yt-dlp returned invalid JSON: {}", e)),
                    };
                }
                Ok(None) => {
                    self.done = true;
                    return match self.stream.finish() {
                        Ok((status, _)) if status.success() => None,
                        Ok((status, stderr)) => {
                            let detail = stderr.trim().lines().last().unwrap_or("").to_string();
                            Some(Err(ArchiverError::remote_lookup(
                                self.context.as_str(),
                                format!("yt-dlp exited with {}: {}", status, detail),
                            )))
                        }
                        Err(e) => Some(Err(ArchiverError::remote_lookup(self.context.as_str(), e.to_string()))),
                    };
                }
                Err(ProcessError::TimedOut(after)) => {
                    return self.fail(format!("timed out after {:?}", after));
                }
                Err(e) => return self.fail(e.to_string()),
            }
        }
        None
    }
}

fn str_field<'a>(value: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
}

fn feed_record(value: &serde_json::Value) -> Option<FeedRecord> {
    let id = str_field(value, &["id"])?;
    Some(FeedRecord {
        video_id: VideoId::from(id),
        title: str_field(value, &["title"]).map(String::from),
    })
}

/// Map a flat search entry to a channel, or `None` for videos and playlists
fn search_result(value: &serde_json::Value) -> Option<SearchResult> {
    let ie_key = str_field(value, &["ie_key"]);
    let id = str_field(value, &["channel_id", "id"])?;
    let is_channel = ie_key == Some("YoutubeTab") && id.starts_with("UC");
    if !is_channel {
        return None;
    }

    let name = str_field(value, &["channel", "title", "uploader"]).unwrap_or(id);
    let url = match str_field(value, &["channel_url", "url"]) {
        Some(url) => url.to_string(),
        None => format!("{}channel/{}", YOUTUBE_BASE_URL, id),
    };

    Some(SearchResult {
        id: id.to_string(),
        name: name.to_string(),
        url,
    })
}

impl RemoteFeed for YtDlp {
    fn get_channel_feed(&self, channel_id: &str, limit: Option<usize>) -> Result<FeedIter<'_>> {
        let url = format!("{}channel/{}/videos", YOUTUBE_BASE_URL, channel_id);
        let extra = match limit {
            Some(n) => vec!["--playlist-end".to_string(), n.to_string()],
            None => Vec::new(),
        };

        let lines = self.json_lines(&url, &extra, channel_id)?;
        Ok(Box::new(lines.filter_map(|item| match item {
            Ok(value) => {
                let record = feed_record(&value);
                if record.is_none() {
                    log::debug!("Feed entry without id: {}", value);
                }
                record.map(Ok)
            }
            Err(e) => Some(Err(e)),
        })))
    }
}

impl ChannelSearch for YtDlp {
    fn search(&self, term: &str) -> Result<SearchIter<'_>> {
        let url = Url::parse_with_params(
            &format!("{}results", YOUTUBE_BASE_URL),
            &[("search_query", term), ("sp", CHANNEL_FILTER)],
        )
        .map_err(|e| ArchiverError::remote_lookup(term, e.to_string()))?;

        let lines = self.json_lines(url.as_str(), &[], term)?;
        Ok(Box::new(lines.filter_map(|item| match item {
            Ok(value) => search_result(&value).map(Ok),
            Err(e) => Some(Err(e)),
        })))
    }
}

/// Latest release tag, read from the redirect of `/releases/latest`
pub fn latest_version(client: &reqwest::blocking::Client) -> Result<String> {
    let response = client.get(format!("{}/latest", RELEASES_URL)).send()?;

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ArchiverError::install("release redirect had no Location header"))?;

    location
        .split("/tag/")
        .nth(1)
        .map(|v| v.trim_end_matches('/').to_string())
        .ok_or_else(|| ArchiverError::install(format!("unexpected release location: {}", location)))
}

fn download(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>> {
    log::debug!("GET {}", url);
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(ArchiverError::install(format!(
            "HTTP {} while downloading {}",
            response.status(),
            url
        )));
    }
    Ok(response.bytes()?.to_vec())
}

/// Download, verify and install the latest yt-dlp release into [`managed_path`]
///
/// Returns the installed version and path.
pub fn install() -> Result<(String, PathBuf)> {
    let client = reqwest::blocking::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let version = latest_version(&client)?;
    log::info!("Latest yt-dlp release: {}", version);

    // Asset downloads redirect to the CDN
    let client = reqwest::blocking::Client::builder().build()?;
    let asset = asset_name();
    let base = format!("{}/download/{}", RELEASES_URL, version);

    let sums = download(&client, &format!("{}/{}", base, CHECKSUMS_ASSET))?;
    let expected = parse_checksums(&String::from_utf8_lossy(&sums), asset)
        .ok_or_else(|| ArchiverError::install(format!("no checksum listed for {}", asset)))?;

    let binary = download(&client, &format!("{}/{}", base, asset))?;
    let actual = format!("{:x}", Sha256::digest(&binary));
    if actual != expected {
        return Err(ArchiverError::install(format!(
            "checksum mismatch for {}: expected {}, got {}",
            asset, expected, actual
        )));
    }

    let target = managed_path()?;
    let dir = target
        .parent()
        .ok_or_else(|| ArchiverError::install("managed path has no parent directory"))?;
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&binary)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o755))?;
    }
    tmp.persist(&target).map_err(|e| ArchiverError::Io(e.error))?;

    log::info!("Installed yt-dlp {} to {:?}", version, target);
    Ok((version, target))
}
