#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sports_events::infrastructure::EventSnapshotCache;
use sports_events::shared::{CacheConfig, ManualClock};
use tempfile::TempDir;

/// テスト用のキャッシュ一式（一時ディレクトリと手動時計）
pub struct CacheContext {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<EventSnapshotCache>,
}

impl CacheContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("cache dir");
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = open_cache(&dir, clock.clone()).await;
        Self { dir, clock, cache }
    }

    /// 同じディレクトリを開き直す（再起動の再現）
    pub async fn reopen(&self) -> Arc<EventSnapshotCache> {
        open_cache(&self.dir, self.clock.clone()).await
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 20, 12, 0, 0).unwrap()
}

async fn open_cache(dir: &TempDir, clock: Arc<ManualClock>) -> Arc<EventSnapshotCache> {
    let config = CacheConfig::in_dir(dir.path());
    Arc::new(
        EventSnapshotCache::open(&config, clock)
            .await
            .expect("open cache"),
    )
}
