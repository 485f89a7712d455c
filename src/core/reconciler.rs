// Reconciliation of the remote window against the local inventory

use crate::core::video::VideoIdSet;

/// What a sync pass has to do for one channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// In the remote window but not on disk
    pub to_fetch: VideoIdSet,
    /// On disk but no longer in the remote window
    pub to_purge: VideoIdSet,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_fetch.is_empty() && self.to_purge.is_empty()
    }
}

/// `to_fetch = remote - local`, `to_purge = local - remote`
///
/// An empty `remote` purges every local video. Callers that cannot tell "no
/// videos" from "lookup failed" must not get here with an empty set.
pub fn reconcile(remote: &VideoIdSet, local: &VideoIdSet) -> SyncPlan {
    SyncPlan {
        to_fetch: remote.difference(local).cloned().collect(),
        to_purge: local.difference(remote).cloned().collect(),
    }
}
