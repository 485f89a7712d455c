//! Deleting local files of videos that left the retention window
//!
//! Matching is `*{video_id}*` inside the channel directory: any non-hidden entry
//! whose name contains the id, which also catches sidecar files such as
//! `abc_thumbnail.jpg` that the scanner itself does not count. Deletion is
//! permanent.

use crate::core::config::Channel;
use crate::core::video::VideoId;
use crate::error::ArchiverError;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of purging one video
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<ArchiverError>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Files in `dir` matched by the glob `*{video_id}*`
///
/// Like a shell glob, `*` does not match a leading dot.
pub fn matching_files(dir: &Path, video_id: &VideoId) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Error listing path {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && name.contains(video_id.as_str())
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    matches
}

#[derive(Debug, Clone)]
pub struct Purger {
    output_root: PathBuf,
}

impl Purger {
    pub fn new(output_root: &Path) -> Self {
        Self {
            output_root: output_root.to_path_buf(),
        }
    }

    /// Delete every file matching `video_id` in the channel directory
    ///
    /// Each failure is logged and recorded; the remaining files are still tried.
    pub fn purge(&self, channel: &Channel, video_id: &VideoId) -> PurgeReport {
        let dir = channel.directory(&self.output_root);
        let mut report = PurgeReport::default();

        for path in matching_files(&dir, video_id) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::info!("Deleted: {}", path.display());
                    report.deleted.push(path);
                }
                Err(source) => {
                    let err = ArchiverError::Delete { path, source };
                    log::error!("{}", err);
                    report.failed.push(err);
                }
            }
        }

        report
    }
}
