pub mod snapshot_file_cache;

pub use snapshot_file_cache::SnapshotFileCache;

use crate::domain::entities::Event;

/// イベント一覧用のディスクキャッシュ
pub type EventSnapshotCache = SnapshotFileCache<Event>;
