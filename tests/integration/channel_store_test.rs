use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tempfile::TempDir;
use yt_archiver::core::{AddOutcome, Channel, ChannelStore, Config};

const CONFIG: &str = r#"channels:
- name: Existing
  id: UCexisting
  keep: 2
downloader:
  output_path: /srv/videos
  command:
  - yt-dlp
  - https://youtu.be/{video_id}
notes: kept verbatim
"#;

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("archive.yaml");
    fs::write(&path, CONFIG).unwrap();
    path
}

#[test]
fn test_add_and_commit_persists_channel() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir);

    let mut store = ChannelStore::open(&path).unwrap();
    let outcome = store
        .add_channel(Channel::new("Fresh", "UCfresh", NonZeroUsize::new(4)))
        .unwrap();
    assert_eq!(outcome, AddOutcome::Added);

    // nothing written before commit
    assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG);

    store.commit().unwrap();
    assert!(store.pending().is_empty());

    let reloaded = Config::load(&path).unwrap();
    let ids: Vec<&str> = reloaded.channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["UCexisting", "UCfresh"]);
    assert_eq!(reloaded.channels[1].keep, NonZeroUsize::new(4));
    assert_eq!(
        reloaded.extra.get("notes"),
        Some(&serde_yaml::Value::String("kept verbatim".to_string()))
    );
}

#[test]
fn test_add_without_keep_omits_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir);

    let mut store = ChannelStore::open(&path).unwrap();
    store.add_channel(Channel::new("Unbounded", "UCall", None)).unwrap();
    store.commit().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let tail = text.split("UCall").nth(1).unwrap();
    let channel_block = tail.split("downloader").next().unwrap();
    assert!(!channel_block.contains("keep"));
}

#[test]
fn test_duplicate_leaves_file_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir);

    let mut store = ChannelStore::open(&path).unwrap();
    let outcome = store
        .add_channel(Channel::new("Renamed", "UCexisting", None))
        .unwrap();

    assert!(matches!(outcome, AddOutcome::Duplicate(ref c) if c.name == "Existing"));
    store.commit().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG);
    assert_eq!(store.channels().len(), 1);
}

#[test]
fn test_commit_leaves_no_temp_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir);

    let mut store = ChannelStore::open(&path).unwrap();
    store.add_channel(Channel::new("A", "UCa", None)).unwrap();
    store.commit().unwrap();

    let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().flatten().collect();
    assert_eq!(entries.len(), 1);
}
