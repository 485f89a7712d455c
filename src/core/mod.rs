// Core sync logic and its external collaborators

pub mod channel_store;
pub mod config;
pub mod fetcher;
pub mod local_scanner;
pub mod process;
pub mod purger;
pub mod reconciler;
pub mod remote_lister;
pub mod search;
pub mod sync;
pub mod validation;
pub mod video;
pub mod yt_dlp;

// Re-export commonly used items
pub use channel_store::{AddOutcome, ChannelStore, ConfigChange};
pub use config::{Channel, Config, DownloaderSettings, SyncSettings};
pub use fetcher::{CommandDownloader, Downloader};
pub use local_scanner::{parse_video_id, FilenameScanner, LocalInventory, LocalVideo};
pub use purger::{PurgeReport, Purger};
pub use reconciler::{reconcile, SyncPlan};
pub use remote_lister::{list_latest, FeedIter, FeedRecord, RemoteFeed};
pub use search::{channel_search, ChannelSearch, SearchIter, SearchResult};
pub use sync::{ChannelOutcome, ChannelReport, SyncDriver, SyncEvent, SyncOptions, SyncReport};
pub use video::{RemoteVideoWindow, VideoId, VideoIdSet};
pub use yt_dlp::YtDlp;
