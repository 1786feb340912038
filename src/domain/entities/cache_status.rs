use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// キャッシュ状態のスナップショット（保存はしない）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStatus {
    pub has_snapshot: bool,
    pub is_fresh: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub approximate_size_bytes: u64,
    pub record_count: usize,
}

impl CacheStatus {
    pub fn empty() -> Self {
        Self {
            has_snapshot: false,
            is_fresh: false,
            last_update: None,
            approximate_size_bytes: 0,
            record_count: 0,
        }
    }
}

impl Default for CacheStatus {
    fn default() -> Self {
        Self::empty()
    }
}
