//! Local inventory inferred from download filenames
//!
//! There is no manifest: a video counts as downloaded when a regular file in the
//! channel directory ends with `[<video id>].<ext>`, e.g. `My Video [aBc123-Q].mp4`.
//! Anything else in the directory (partial downloads, thumbnails without the tag,
//! subdirectories) is ignored.

use crate::core::video::{VideoId, VideoIdSet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

static VIDEO_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([\w-]+)\]\.\w+$").expect("video file pattern is valid"));

/// Extract the video id from a filename of the form `title [id].ext`
///
/// When several bracket groups are present, the one directly before the
/// extension wins.
pub fn parse_video_id(file_name: &str) -> Option<VideoId> {
    VIDEO_FILE_PATTERN
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId::from(m.as_str()))
}

/// A recognised video file
#[derive(Debug, Clone)]
pub struct LocalVideo {
    pub id: VideoId,
    pub path: PathBuf,
    pub size: u64,
}

/// Source of the set of videos already present locally
pub trait LocalInventory: Send + Sync {
    /// Ids present under `root/channel_name`; an unreadable directory yields an empty set
    fn scan_local(&self, root: &Path, channel_name: &str) -> VideoIdSet;
}

/// [`LocalInventory`] backed by directory listings and the filename convention
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameScanner;

impl FilenameScanner {
    pub fn new() -> Self {
        Self
    }

    /// List recognised video files in `root/channel_name`
    pub fn scan_files(&self, root: &Path, channel_name: &str) -> io::Result<Vec<LocalVideo>> {
        let dir = root.join(channel_name);
        let mut videos = Vec::new();

        for entry in fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            // fs::metadata follows symlinks, so a link to a video file counts
            let metadata = match fs::metadata(&path) {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };

            let file_name = entry.file_name();
            let Some(id) = parse_video_id(&file_name.to_string_lossy()) else {
                log::trace!("Ignoring {:?}", path);
                continue;
            };

            videos.push(LocalVideo {
                id,
                path,
                size: metadata.len(),
            });
        }

        videos.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
        Ok(videos)
    }
}

impl LocalInventory for FilenameScanner {
    fn scan_local(&self, root: &Path, channel_name: &str) -> VideoIdSet {
        match self.scan_files(root, channel_name) {
            Ok(videos) => videos.into_iter().map(|v| v.id).collect(),
            Err(e) => {
                log::warn!(
                    "Error listing path {:?}: {}",
                    root.join(channel_name),
                    e
                );
                VideoIdSet::new()
            }
        }
    }
}
