use crate::domain::entities::{CacheStatus, Event};
use crate::shared::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// 最後に取得したイベント一覧を保持する永続キャッシュのポート
///
/// 「見つからない」はエラーにしない。`Err` は I/O やデコードの失敗のみで、
/// 呼び出し側はキャッシュ空として扱ってよい。
#[async_trait]
pub trait EventCache: Send + Sync {
    /// 一覧を丸ごと置き換え、現在時刻を最終更新として記録
    async fn save(&self, events: &[Event]) -> Result<(), AppError>;

    /// 保存済みの一覧。書き込み実績がなければ `None`
    async fn load(&self) -> Result<Option<Vec<Event>>, AppError>;

    /// 既定の鮮度ウィンドウ内か
    async fn is_fresh(&self) -> bool;

    /// 指定した期間内に更新されているか
    async fn is_fresh_within(&self, max_age: Duration) -> bool;

    async fn last_update_time(&self) -> Option<DateTime<Utc>>;

    /// ペイロードとタイムスタンプをまとめて削除（空でも成功）
    async fn clear(&self) -> Result<(), AppError>;

    async fn size_bytes(&self) -> u64;

    async fn status(&self) -> CacheStatus;
}
