//! Remote retention window for a channel
//!
//! [`list_latest`] pulls records from a [`RemoteFeed`] in server order (newest
//! first) and stops after `keep` records. A failed lookup is an error, never an
//! empty window: an empty window is a legitimate answer that purges everything.

use crate::core::validation;
use crate::core::video::{RemoteVideoWindow, VideoId};
use crate::error::{ArchiverError, Result};
use std::num::NonZeroUsize;

/// One entry of a channel feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub video_id: VideoId,
    pub title: Option<String>,
}

impl FeedRecord {
    pub fn new<V: Into<VideoId>>(video_id: V) -> Self {
        Self {
            video_id: video_id.into(),
            title: None,
        }
    }
}

/// Lazy iterator over feed records
pub type FeedIter<'a> = Box<dyn Iterator<Item = Result<FeedRecord>> + 'a>;

/// Service producing a channel's uploads, newest first
pub trait RemoteFeed: Send + Sync {
    /// Open the feed of `channel_id`
    ///
    /// `limit` is a hint for how many records the caller will read; an
    /// implementation may ignore it.
    fn get_channel_feed(&self, channel_id: &str, limit: Option<usize>) -> Result<FeedIter<'_>>;
}

/// Collect the `keep` newest video ids of a channel (all of them if `keep` is `None`)
///
/// `keep` bounds the number of feed records read; a duplicate id still consumes
/// a slot and collapses into the window.
pub fn list_latest(
    feed: &dyn RemoteFeed,
    channel_id: &str,
    keep: Option<NonZeroUsize>,
) -> Result<RemoteVideoWindow> {
    validation::validate_channel_id(channel_id)
        .map_err(|e| ArchiverError::remote_lookup(channel_id, e.to_string()))?;

    let limit = keep.map(NonZeroUsize::get);
    let records = feed
        .get_channel_feed(channel_id, limit)
        .map_err(|e| as_lookup_error(channel_id, e))?;

    let mut window = RemoteVideoWindow::new();
    for (index, record) in records.enumerate() {
        let record = record.map_err(|e| as_lookup_error(channel_id, e))?;
        if !window.push(record.video_id.clone()) {
            log::debug!("Duplicate video '{}' in feed of {}", record.video_id, channel_id);
        }

        if Some(index + 1) == limit {
            break;
        }
    }

    log::debug!("Remote window for {}: {} video(s)", channel_id, window.len());
    Ok(window)
}

fn as_lookup_error(channel_id: &str, e: ArchiverError) -> ArchiverError {
    match e {
        ArchiverError::RemoteLookup { .. } => e,
        other => ArchiverError::remote_lookup(channel_id, other.to_string()),
    }
}
