//! Sync driver: scan, list, reconcile, fetch, purge, one channel at a time
//!
//! Failures are contained to the smallest unit: a failed download or deletion
//! is recorded and the next one runs; a failed remote lookup skips that channel
//! entirely (nothing fetched, nothing purged) and the next channel runs.
//!
//! # Examples
//!
//! ```no_run
//! use yt_archiver::core::{CommandDownloader, Config, FilenameScanner, SyncDriver, YtDlp};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("archive.yaml"))?;
//! let yt_dlp = yt_archiver::core::yt_dlp::resolve(&config)?;
//! let driver = SyncDriver::new(
//!     &config.output_root(),
//!     Box::new(YtDlp::new(yt_dlp.clone(), config.sync.lookup_timeout())),
//!     Box::new(CommandDownloader::from_config(&config).with_yt_dlp(Some(yt_dlp))),
//!     Box::new(FilenameScanner::new()),
//! );
//! let report = driver.sync_all(config.channels());
//! println!("{} channel(s) synced", report.synced());
//! # Ok::<(), yt_archiver::ArchiverError>(())
//! ```

use crate::core::config::{Channel, SyncSettings};
use crate::core::fetcher::Downloader;
use crate::core::local_scanner::LocalInventory;
use crate::core::purger::Purger;
use crate::core::reconciler::{reconcile, SyncPlan};
use crate::core::remote_lister::{list_latest, RemoteFeed};
use crate::core::validation;
use crate::core::video::VideoId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute plans without fetching or deleting
    pub dry_run: bool,
    /// Channels processed concurrently
    pub jobs: usize,
    /// Do not purge when the remote window is empty but local videos exist
    pub protect_on_empty_remote: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
            protect_on_empty_remote: false,
        }
    }
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            dry_run: false,
            jobs: settings.jobs.max(1),
            protect_on_empty_remote: settings.protect_on_empty_remote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Synced,
    /// Dry run: plan computed, nothing executed
    Planned,
    /// Remote lookup failed; local files untouched
    LookupFailed(String),
    /// Channel name is not a usable directory name; nothing touched
    Rejected(String),
    Cancelled,
}

/// What happened to one channel during a sync
#[derive(Debug, Clone)]
pub struct ChannelReport {
    pub channel: Channel,
    pub outcome: ChannelOutcome,
    pub plan: SyncPlan,
    pub fetched: Vec<VideoId>,
    pub fetch_failed: Vec<VideoId>,
    pub purged: Vec<VideoId>,
    pub purge_failed: Vec<VideoId>,
    pub files_deleted: usize,
    /// Purge withheld because the remote window came back empty
    pub purge_withheld: bool,
}

impl ChannelReport {
    fn new(channel: &Channel, outcome: ChannelOutcome) -> Self {
        Self {
            channel: channel.clone(),
            outcome,
            plan: SyncPlan::default(),
            fetched: Vec::new(),
            fetch_failed: Vec::new(),
            purged: Vec::new(),
            purge_failed: Vec::new(),
            files_deleted: 0,
            purge_withheld: false,
        }
    }

    pub fn has_failures(&self) -> bool {
        matches!(
            self.outcome,
            ChannelOutcome::LookupFailed(_) | ChannelOutcome::Rejected(_)
        ) || !self.fetch_failed.is_empty()
            || !self.purge_failed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub channels: Vec<ChannelReport>,
    pub cancelled: bool,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.channels
            .iter()
            .filter(|r| matches!(r.outcome, ChannelOutcome::Synced | ChannelOutcome::Planned))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.channels.iter().filter(|r| r.has_failures()).count()
    }
}

/// Progress notifications emitted while syncing
#[derive(Debug)]
pub enum SyncEvent<'a> {
    ChannelStarted(&'a Channel),
    Fetching(&'a Channel, &'a VideoId),
    Purging(&'a Channel, &'a VideoId),
    ChannelFinished(&'a ChannelReport),
}

type Observer = dyn Fn(&SyncEvent<'_>) + Send + Sync;

pub struct SyncDriver {
    output_root: PathBuf,
    feed: Box<dyn RemoteFeed>,
    downloader: Box<dyn Downloader>,
    inventory: Box<dyn LocalInventory>,
    purger: Purger,
    options: SyncOptions,
    cancel: Arc<AtomicBool>,
    dir_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
    observer: Option<Box<Observer>>,
}

impl SyncDriver {
    pub fn new(
        output_root: &Path,
        feed: Box<dyn RemoteFeed>,
        downloader: Box<dyn Downloader>,
        inventory: Box<dyn LocalInventory>,
    ) -> Self {
        Self {
            output_root: output_root.to_path_buf(),
            feed,
            downloader,
            inventory,
            purger: Purger::new(output_root),
            options: SyncOptions::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            dir_locks: Mutex::new(HashMap::new()),
            observer: None,
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&SyncEvent<'_>) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Flag that stops the run before the next channel or video operation
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn emit(&self, event: SyncEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    fn dir_lock(&self, dir: &Path) -> Arc<Mutex<()>> {
        self.dir_locks
            .lock()
            .entry(dir.to_path_buf())
            .or_default()
            .clone()
    }

    /// Sync a single channel
    pub fn sync_channel(&self, channel: &Channel) -> ChannelReport {
        if self.cancelled() {
            return ChannelReport::new(channel, ChannelOutcome::Cancelled);
        }
        self.emit(SyncEvent::ChannelStarted(channel));

        if let Err(e) = validation::validate_channel_name(&channel.name) {
            log::error!("Skipping channel '{}': {}", channel.id, e);
            let report = ChannelReport::new(channel, ChannelOutcome::Rejected(e.to_string()));
            self.emit(SyncEvent::ChannelFinished(&report));
            return report;
        }

        let dir = channel.directory(&self.output_root);
        let lock = self.dir_lock(&dir);
        let _guard = lock.lock();

        let report = self.sync_locked(channel);
        self.emit(SyncEvent::ChannelFinished(&report));
        report
    }

    fn sync_locked(&self, channel: &Channel) -> ChannelReport {
        let local = self.inventory.scan_local(&self.output_root, &channel.name);

        let remote = match list_latest(self.feed.as_ref(), &channel.id, channel.keep) {
            Ok(window) => window,
            Err(e) => {
                log::error!("Skipping channel '{}': {}", channel.name, e);
                return ChannelReport::new(channel, ChannelOutcome::LookupFailed(e.to_string()));
            }
        };

        let plan = reconcile(remote.ids(), &local);
        log::info!(
            "Channel '{}': {} remote, {} local, {} to fetch, {} to purge",
            channel.name,
            remote.len(),
            local.len(),
            plan.to_fetch.len(),
            plan.to_purge.len()
        );

        let mut report = ChannelReport::new(channel, ChannelOutcome::Synced);

        if remote.is_empty() && !local.is_empty() {
            if self.options.protect_on_empty_remote {
                log::warn!(
                    "Remote window of '{}' is empty; keeping {} local video(s)",
                    channel.name,
                    local.len()
                );
                report.purge_withheld = true;
            } else {
                log::warn!(
                    "Remote window of '{}' is empty; purging all {} local video(s)",
                    channel.name,
                    local.len()
                );
            }
        }
        report.plan = plan;

        if self.options.dry_run {
            report.outcome = ChannelOutcome::Planned;
            return report;
        }

        for video_id in &report.plan.to_fetch {
            if self.cancelled() {
                report.outcome = ChannelOutcome::Cancelled;
                return report;
            }
            self.emit(SyncEvent::Fetching(channel, video_id));
            match self.downloader.fetch(channel, video_id) {
                Ok(()) => report.fetched.push(video_id.clone()),
                Err(e) => {
                    log::warn!("{}", e);
                    report.fetch_failed.push(video_id.clone());
                }
            }
        }

        if report.purge_withheld {
            return report;
        }

        for video_id in &report.plan.to_purge {
            if self.cancelled() {
                report.outcome = ChannelOutcome::Cancelled;
                return report;
            }
            self.emit(SyncEvent::Purging(channel, video_id));
            let purge = self.purger.purge(channel, video_id);
            report.files_deleted += purge.deleted.len();
            if purge.is_clean() {
                report.purged.push(video_id.clone());
            } else {
                report.purge_failed.push(video_id.clone());
            }
        }

        report
    }

    /// Sync every channel; channels are independent and one failing never stops the rest
    pub fn sync_all(&self, channels: &[Channel]) -> SyncReport {
        let jobs = self.options.jobs.clamp(1, channels.len().max(1));

        let reports = if jobs == 1 {
            channels.iter().map(|c| self.sync_channel(c)).collect()
        } else {
            self.sync_parallel(channels, jobs)
        };

        SyncReport {
            channels: reports,
            cancelled: self.cancelled(),
        }
    }

    fn sync_parallel(&self, channels: &[Channel], jobs: usize) -> Vec<ChannelReport> {
        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<ChannelReport>>> = Mutex::new(vec![None; channels.len()]);

        thread::scope(|scope| {
            for _ in 0..jobs {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(channel) = channels.get(index) else {
                        break;
                    };
                    let report = self.sync_channel(channel);
                    slots.lock()[index] = Some(report);
                });
            }
        });

        slots
            .into_inner()
            .into_iter()
            .zip(channels)
            .map(|(slot, channel)| {
                slot.unwrap_or_else(|| ChannelReport::new(channel, ChannelOutcome::Cancelled))
            })
            .collect()
    }
}
