use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use yt_archiver::core::{
    Channel, ChannelOutcome, Downloader, FeedIter, FeedRecord, FilenameScanner, LocalInventory,
    RemoteFeed, SyncDriver, SyncOptions, VideoId, VideoIdSet,
};
use yt_archiver::{ArchiverError, Result};

/// Feed serving fixed uploads per channel id; unknown ids fail the lookup
#[derive(Default)]
struct FakeFeed {
    uploads: HashMap<String, Vec<&'static str>>,
}

impl FakeFeed {
    fn with(mut self, channel_id: &str, uploads: &[&'static str]) -> Self {
        self.uploads.insert(channel_id.to_string(), uploads.to_vec());
        self
    }
}

impl RemoteFeed for FakeFeed {
    fn get_channel_feed(&self, channel_id: &str, _limit: Option<usize>) -> Result<FeedIter<'_>> {
        let uploads = self
            .uploads
            .get(channel_id)
            .ok_or_else(|| ArchiverError::remote_lookup(channel_id, "channel unavailable"))?;
        Ok(Box::new(uploads.iter().map(|id| Ok(FeedRecord::new(*id)))))
    }
}

/// Downloader that writes `Video [id].mp4`, failing for the configured ids
struct FileWriter {
    root: PathBuf,
    failing: HashSet<&'static str>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FileWriter {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            failing: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(mut self, ids: &[&'static str]) -> Self {
        self.failing.extend(ids);
        self
    }
}

impl Downloader for FileWriter {
    fn fetch(&self, channel: &Channel, video_id: &VideoId) -> Result<()> {
        self.calls.lock().push(video_id.to_string());
        if self.failing.contains(video_id.as_str()) {
            return Err(ArchiverError::download(video_id.as_str(), "exit status 1"));
        }
        let dir = channel.directory(&self.root);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("Video [{}].mp4", video_id)), b"data")?;
        Ok(())
    }
}

/// Downloader that tracks how many fetches run at once
#[derive(Default)]
struct OverlapTracker {
    in_flight: AtomicUsize,
    high_water: Arc<AtomicUsize>,
}

impl Downloader for OverlapTracker {
    fn fetch(&self, _channel: &Channel, _video_id: &VideoId) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn seed(root: &Path, channel: &str, ids: &[&str]) {
    let dir = root.join(channel);
    fs::create_dir_all(&dir).unwrap();
    for id in ids {
        fs::write(dir.join(format!("Old upload [{}].mp4", id)), b"old").unwrap();
    }
}

fn ids(list: &[&str]) -> VideoIdSet {
    list.iter().map(|id| VideoId::from(*id)).collect()
}

fn local(root: &Path, channel: &str) -> VideoIdSet {
    FilenameScanner::new().scan_local(root, channel)
}

fn driver(root: &Path, feed: FakeFeed, downloader: FileWriter) -> SyncDriver {
    SyncDriver::new(
        root,
        Box::new(feed),
        Box::new(downloader),
        Box::new(FilenameScanner::new()),
    )
}

#[test]
fn test_window_slides_forward() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Chan", &["v1", "v2"]);

    let feed = FakeFeed::default().with("UCchan", &["v3", "v2", "v1"]);
    let channel = Channel::new("Chan", "UCchan", NonZeroUsize::new(2));

    let report = driver(root, feed, FileWriter::new(root)).sync_channel(&channel);

    assert_eq!(report.outcome, ChannelOutcome::Synced);
    assert_eq!(report.fetched, vec![VideoId::from("v3")]);
    assert_eq!(report.purged, vec![VideoId::from("v1")]);
    assert_eq!(local(root, "Chan"), ids(&["v2", "v3"]));
}

#[test]
fn test_second_sync_is_a_no_op() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let channel = Channel::new("Chan", "UCchan", NonZeroUsize::new(2));

    let first = driver(
        root,
        FakeFeed::default().with("UCchan", &["v3", "v2", "v1"]),
        FileWriter::new(root),
    )
    .sync_channel(&channel);
    assert_eq!(first.fetched.len(), 2);

    let writer = FileWriter::new(root);
    let calls = writer.calls.clone();
    let second = driver(
        root,
        FakeFeed::default().with("UCchan", &["v3", "v2", "v1"]),
        writer,
    )
    .sync_channel(&channel);

    assert!(second.plan.is_empty());
    assert!(calls.lock().is_empty());
    assert_eq!(local(root, "Chan"), ids(&["v2", "v3"]));
}

#[test]
fn test_empty_remote_purges_everything() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Gone", &["a1", "a2", "a3", "a4", "a5"]);

    let feed = FakeFeed::default().with("UCgone", &[]);
    let channel = Channel::new("Gone", "UCgone", None);

    let report = driver(root, feed, FileWriter::new(root)).sync_channel(&channel);

    assert_eq!(report.purged.len(), 5);
    assert_eq!(report.files_deleted, 5);
    assert!(local(root, "Gone").is_empty());
}

#[test]
fn test_empty_remote_protected() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Gone", &["a1", "a2"]);

    let feed = FakeFeed::default().with("UCgone", &[]);
    let channel = Channel::new("Gone", "UCgone", None);
    let options = SyncOptions {
        protect_on_empty_remote: true,
        ..SyncOptions::default()
    };

    let report = driver(root, feed, FileWriter::new(root))
        .with_options(options)
        .sync_channel(&channel);

    assert!(report.purge_withheld);
    assert!(report.purged.is_empty());
    assert_eq!(local(root, "Gone"), ids(&["a1", "a2"]));
}

#[test]
fn test_lookup_failure_skips_channel_only() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Broken", &["b1", "b2"]);

    let feed = FakeFeed::default().with("UCok", &["o1"]);
    let channels = vec![
        Channel::new("Broken", "UCbroken", NonZeroUsize::new(1)),
        Channel::new("Fine", "UCok", NonZeroUsize::new(1)),
    ];

    let report = driver(root, feed, FileWriter::new(root)).sync_all(&channels);

    assert!(matches!(report.channels[0].outcome, ChannelOutcome::LookupFailed(_)));
    assert_eq!(local(root, "Broken"), ids(&["b1", "b2"]));
    assert_eq!(report.channels[1].outcome, ChannelOutcome::Synced);
    assert_eq!(local(root, "Fine"), ids(&["o1"]));
    assert_eq!(report.synced(), 1);
    assert_eq!(report.failed(), 1);
}

#[test]
fn test_failed_download_does_not_stop_the_rest() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Chan", &["old"]);

    let feed = FakeFeed::default().with("UCchan", &["n3", "n2", "n1"]);
    let writer = FileWriter::new(root).failing(&["n2"]);
    let calls = writer.calls.clone();
    let channel = Channel::new("Chan", "UCchan", NonZeroUsize::new(3));

    let report = driver(root, feed, writer).sync_channel(&channel);

    assert_eq!(calls.lock().len(), 3);
    assert_eq!(report.fetch_failed, vec![VideoId::from("n2")]);
    assert_eq!(report.purged, vec![VideoId::from("old")]);
    // the missing video shows up in the next plan
    assert_eq!(local(root, "Chan"), ids(&["n1", "n3"]));
}

#[test]
fn test_purge_leaves_unrelated_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Chan", &["keep1", "drop1"]);
    let dir = root.join("Chan");
    fs::write(dir.join("Old upload [drop1].en.vtt"), b"subs").unwrap();
    fs::write(dir.join("playlist.txt"), b"notes").unwrap();

    let feed = FakeFeed::default().with("UCchan", &["keep1"]);
    let channel = Channel::new("Chan", "UCchan", None);

    let report = driver(root, feed, FileWriter::new(root)).sync_channel(&channel);

    assert_eq!(report.files_deleted, 2);
    assert!(dir.join("playlist.txt").exists());
    assert!(dir.join("Old upload [keep1].mp4").exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Chan", &["v1"]);

    let feed = FakeFeed::default().with("UCchan", &["v2"]);
    let writer = FileWriter::new(root);
    let calls = writer.calls.clone();
    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };

    let report = driver(root, feed, writer)
        .with_options(options)
        .sync_channel(&Channel::new("Chan", "UCchan", None));

    assert_eq!(report.outcome, ChannelOutcome::Planned);
    assert_eq!(report.plan.to_fetch, ids(&["v2"]));
    assert_eq!(report.plan.to_purge, ids(&["v1"]));
    assert!(calls.lock().is_empty());
    assert_eq!(local(root, "Chan"), ids(&["v1"]));
}

#[test]
fn test_parallel_jobs_keep_channel_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let mut feed = FakeFeed::default();
    let mut channels = Vec::new();
    let names = ["c0", "c1", "c2", "c3", "c4", "c5"];
    let uploads: [&'static str; 6] = ["u0", "u1", "u2", "u3", "u4", "u5"];
    for (name, upload) in names.iter().zip(uploads) {
        let id = format!("UC{}", name);
        feed = feed.with(&id, &[upload]);
        channels.push(Channel::new(*name, id, None));
    }

    let options = SyncOptions {
        jobs: 3,
        ..SyncOptions::default()
    };
    let report = driver(root, feed, FileWriter::new(root))
        .with_options(options)
        .sync_all(&channels);

    let order: Vec<&str> = report.channels.iter().map(|r| r.channel.name.as_str()).collect();
    assert_eq!(order, names.to_vec());
    assert_eq!(report.synced(), 6);
    for (name, upload) in names.iter().zip(uploads) {
        assert_eq!(local(root, name), ids(&[upload]));
    }
}

#[test]
fn test_cancelled_before_start() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Chan", &["v1"]);

    let sync = driver(
        root,
        FakeFeed::default().with("UCchan", &[]),
        FileWriter::new(root),
    );
    sync.cancel_flag()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let report = sync.sync_all(&[Channel::new("Chan", "UCchan", None)]);

    assert!(report.cancelled);
    assert_eq!(report.channels[0].outcome, ChannelOutcome::Cancelled);
    assert_eq!(local(root, "Chan"), ids(&["v1"]));
}

#[test]
fn test_bad_channel_id_does_not_block_others() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root, "Bad", &["x1"]);

    let config = yt_archiver::Config::parse(
        "channels:\n  - {name: Bad, id: 'UC bad id'}\n  - {name: Good, id: UCgood}\ndownloader:\n  output_path: /unused\n",
    )
    .unwrap();
    let feed = FakeFeed::default().with("UCgood", &["g1"]);

    let report = driver(root, feed, FileWriter::new(root)).sync_all(config.channels());

    assert!(matches!(report.channels[0].outcome, ChannelOutcome::LookupFailed(_)));
    assert_eq!(local(root, "Bad"), ids(&["x1"]));
    assert_eq!(report.channels[1].outcome, ChannelOutcome::Synced);
    assert_eq!(local(root, "Good"), ids(&["g1"]));
}

#[test]
fn test_unsafe_channel_name_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("videos");
    fs::create_dir(&root).unwrap();
    seed(temp_dir.path(), "outside", &["o1"]);

    let feed = FakeFeed::default()
        .with("UCescape", &[])
        .with("UCgood", &["g1"]);
    let channels = vec![
        Channel::new("../outside", "UCescape", None),
        Channel::new("Good", "UCgood", None),
    ];

    let report = driver(&root, feed, FileWriter::new(&root)).sync_all(&channels);

    assert!(matches!(report.channels[0].outcome, ChannelOutcome::Rejected(_)));
    assert_eq!(local(temp_dir.path(), "outside"), ids(&["o1"]));
    assert_eq!(local(&root, "Good"), ids(&["g1"]));
}

#[test]
fn test_shared_directory_is_never_synced_concurrently() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let feed = FakeFeed::default()
        .with("UCfirst", &["f1", "f2", "f3"])
        .with("UCsecond", &["s1", "s2", "s3"]);
    let channels = vec![
        Channel::new("Shared", "UCfirst", None),
        Channel::new("Shared", "UCsecond", None),
    ];

    let tracker = OverlapTracker::default();
    let high_water = tracker.high_water.clone();
    let options = SyncOptions {
        jobs: 2,
        ..SyncOptions::default()
    };

    let report = SyncDriver::new(
        root,
        Box::new(feed),
        Box::new(tracker),
        Box::new(FilenameScanner::new()),
    )
    .with_options(options)
    .sync_all(&channels);

    assert_eq!(report.synced(), 2);
    assert_eq!(report.channels.iter().map(|r| r.fetched.len()).sum::<usize>(), 6);
    assert_eq!(high_water.load(Ordering::SeqCst), 1);
}
