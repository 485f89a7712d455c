//! Video identifiers and the remote retention window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque token identifying a remote video within a channel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

/// Set of video ids, ordered so fetch and purge run deterministically
pub type VideoIdSet = BTreeSet<VideoId>;

impl VideoId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        VideoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        VideoId(id.to_string())
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        VideoId(id)
    }
}

/// The newest `keep` video ids of a channel, newest first
///
/// Rebuilt from the feed on every sync. Duplicate ids reported by the feed
/// collapse onto their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteVideoWindow {
    ordered: Vec<VideoId>,
    ids: VideoIdSet,
}

impl RemoteVideoWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id, returning false if it was already in the window
    pub fn push(&mut self, id: VideoId) -> bool {
        if self.ids.insert(id.clone()) {
            self.ordered.push(id);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in feed order, newest first
    pub fn newest_first(&self) -> &[VideoId] {
        &self.ordered
    }

    pub fn ids(&self) -> &VideoIdSet {
        &self.ids
    }

    pub fn into_ids(self) -> VideoIdSet {
        self.ids
    }
}

impl FromIterator<VideoId> for RemoteVideoWindow {
    fn from_iter<I: IntoIterator<Item = VideoId>>(iter: I) -> Self {
        let mut window = RemoteVideoWindow::new();
        for id in iter {
            window.push(id);
        }
        window
    }
}
