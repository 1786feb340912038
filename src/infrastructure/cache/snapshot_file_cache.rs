use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::RwLock};

use crate::application::ports::EventCache;
use crate::domain::entities::{CacheStatus, Event};
use crate::infrastructure::storage::{PreferenceStore, atomic_file};
use crate::shared::{AppError, CacheConfig, Clock};

/// 最新スナップショット1件をディスクに保持するキャッシュ
///
/// ペイロードは JSON 配列として1ファイルに、最終更新時刻は
/// ファイルの mtime ではなく設定ストアに別途記録する。
/// 書き込みは読み手から見て全部か無しか。
pub struct SnapshotFileCache<T> {
    payload_path: PathBuf,
    timestamp_key: String,
    preferences: Arc<PreferenceStore>,
    clock: Arc<dyn Clock>,
    freshness_window: Duration,
    lock: RwLock<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SnapshotFileCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// 設定に従ってキャッシュディレクトリと設定ストアを開く
    pub async fn open(config: &CacheConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        fs::create_dir_all(&config.cache_dir).await.map_err(|err| {
            AppError::Persistence(format!("Failed to create cache dir: {err}"))
        })?;
        let preferences = Arc::new(PreferenceStore::open(config.preferences_path()).await?);

        let cache = Self::with_store(
            config.payload_path(),
            preferences,
            clock,
            config.freshness_window(),
        );
        cache.recover_interrupted_save().await;
        Ok(cache)
    }

    pub fn with_store(
        payload_path: PathBuf,
        preferences: Arc<PreferenceStore>,
        clock: Arc<dyn Clock>,
        freshness_window: Duration,
    ) -> Self {
        let file_name = payload_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());

        Self {
            timestamp_key: format!("{file_name}.last_update"),
            payload_path,
            preferences,
            clock,
            freshness_window,
            lock: RwLock::new(()),
            _marker: PhantomData,
        }
    }

    pub fn payload_path(&self) -> &Path {
        &self.payload_path
    }

    /// 一覧全体を置き換え、現在時刻を記録
    pub async fn save(&self, items: &[T]) -> Result<(), AppError> {
        // エンコードに失敗した時点では何も触っていない
        let bytes = serde_json::to_vec(items)
            .map_err(|err| AppError::Persistence(format!("Failed to encode snapshot: {err}")))?;

        let _guard = self.lock.write().await;
        let saved_at = self.clock.now();

        let staged = atomic_file::stage(&self.payload_path, &bytes)
            .await
            .map_err(|err| AppError::Persistence(format!("Failed to stage snapshot: {err}")))?;

        let backup = self.backup_path();
        let had_previous = match fs::rename(&self.payload_path, &backup).await {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                let _ = fs::remove_file(&staged).await;
                return Err(AppError::Persistence(format!(
                    "Failed to set aside previous snapshot: {err}"
                )));
            }
        };

        if let Err(err) = fs::rename(&staged, &self.payload_path).await {
            let _ = fs::remove_file(&staged).await;
            self.restore_previous(had_previous, &backup).await;
            return Err(AppError::Persistence(format!(
                "Failed to publish snapshot: {err}"
            )));
        }

        if let Err(err) = self.preferences.set(&self.timestamp_key, &saved_at).await {
            self.restore_previous(had_previous, &backup).await;
            return Err(err);
        }

        if had_previous && let Err(err) = atomic_file::remove_if_exists(&backup).await {
            tracing::debug!("Failed to drop snapshot backup: {}", err);
        }

        tracing::info!(
            "Saved snapshot of {} records to {}",
            items.len(),
            self.payload_path.display()
        );
        Ok(())
    }

    /// 保存済みの一覧。未保存・クリア済みなら `None`
    pub async fn load(&self) -> Result<Option<Vec<T>>, AppError> {
        let _guard = self.lock.read().await;
        self.read_snapshot().await
    }

    pub async fn is_fresh(&self) -> bool {
        self.is_fresh_within(self.freshness_window).await
    }

    pub async fn is_fresh_within(&self, max_age: Duration) -> bool {
        let _guard = self.lock.read().await;
        let last_update = self.read_timestamp().await;
        self.fresh_at(last_update, max_age)
    }

    pub async fn last_update_time(&self) -> Option<DateTime<Utc>> {
        let _guard = self.lock.read().await;
        self.read_timestamp().await
    }

    /// ペイロードとタイムスタンプをまとめて削除
    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.lock.write().await;

        let removed = atomic_file::remove_if_exists(&self.payload_path)
            .await
            .map_err(|err| AppError::Persistence(format!("Failed to remove snapshot: {err}")))?;
        self.preferences.remove(&self.timestamp_key).await?;

        if removed {
            tracing::info!("Cleared snapshot at {}", self.payload_path.display());
        } else {
            tracing::debug!("Snapshot already empty");
        }
        Ok(())
    }

    pub async fn size_bytes(&self) -> u64 {
        let _guard = self.lock.read().await;
        self.payload_len().await
    }

    /// 診断用の状態。`record_count` は同じ瞬間の `load()` と一致する
    pub async fn status(&self) -> CacheStatus {
        let _guard = self.lock.read().await;
        let last_update = self.read_timestamp().await;
        let approximate_size_bytes = self.payload_len().await;

        match self.read_snapshot().await {
            Ok(Some(items)) => CacheStatus {
                has_snapshot: true,
                is_fresh: self.fresh_at(last_update, self.freshness_window),
                last_update,
                approximate_size_bytes,
                record_count: items.len(),
            },
            Ok(None) => CacheStatus {
                approximate_size_bytes,
                ..CacheStatus::empty()
            },
            Err(err) => {
                tracing::warn!("Snapshot unreadable while computing status: {}", err);
                CacheStatus {
                    last_update,
                    approximate_size_bytes,
                    ..CacheStatus::empty()
                }
            }
        }
    }

    async fn read_snapshot(&self) -> Result<Option<Vec<T>>, AppError> {
        let bytes = match fs::read(&self.payload_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::Persistence(format!(
                    "Failed to read snapshot: {err}"
                )));
            }
        };

        if self.read_timestamp().await.is_none() {
            // タイムスタンプの無いペイロードは中断された書き込みの残骸
            tracing::debug!(
                "Ignoring snapshot without timestamp at {}",
                self.payload_path.display()
            );
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| AppError::Persistence(format!("Failed to decode snapshot: {err}")))
    }

    async fn read_timestamp(&self) -> Option<DateTime<Utc>> {
        match self.preferences.get(&self.timestamp_key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Unreadable snapshot timestamp: {}", err);
                None
            }
        }
    }

    async fn payload_len(&self) -> u64 {
        fs::metadata(&self.payload_path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0)
    }

    fn fresh_at(&self, last_update: Option<DateTime<Utc>>, max_age: Duration) -> bool {
        let Some(last_update) = last_update else {
            return false;
        };
        let age = self.clock.now() - last_update;
        match chrono::Duration::from_std(max_age) {
            Ok(window) => age < window,
            Err(_) => true,
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .payload_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.payload_path.with_file_name(name)
    }

    /// 保存途中で中断された書き込みの残骸を片付ける
    async fn recover_interrupted_save(&self) {
        let _guard = self.lock.write().await;

        if let Err(err) = atomic_file::sweep_staged(&self.payload_path).await {
            tracing::warn!("Failed to sweep staged snapshots: {}", err);
        }

        let backup = self.backup_path();
        if !fs::try_exists(&backup).await.unwrap_or(false) {
            return;
        }

        let result = if fs::try_exists(&self.payload_path).await.unwrap_or(false) {
            // 新しいペイロードは公開済み
            atomic_file::remove_if_exists(&backup).await.map(|_| ())
        } else {
            // 2つの rename の間で中断された
            tracing::info!("Restoring snapshot backup {}", backup.display());
            fs::rename(&backup, &self.payload_path).await
        };
        if let Err(err) = result {
            tracing::warn!("Failed to recover interrupted snapshot write: {}", err);
        }
    }

    async fn restore_previous(&self, had_previous: bool, backup: &Path) {
        let result = if had_previous {
            fs::rename(backup, &self.payload_path).await
        } else {
            atomic_file::remove_if_exists(&self.payload_path)
                .await
                .map(|_| ())
        };
        if let Err(err) = result {
            tracing::error!("Failed to roll back snapshot write: {}", err);
        }
    }
}

#[async_trait]
impl EventCache for SnapshotFileCache<Event> {
    async fn save(&self, events: &[Event]) -> Result<(), AppError> {
        SnapshotFileCache::save(self, events).await
    }

    async fn load(&self) -> Result<Option<Vec<Event>>, AppError> {
        SnapshotFileCache::load(self).await
    }

    async fn is_fresh(&self) -> bool {
        SnapshotFileCache::is_fresh(self).await
    }

    async fn is_fresh_within(&self, max_age: Duration) -> bool {
        SnapshotFileCache::is_fresh_within(self, max_age).await
    }

    async fn last_update_time(&self) -> Option<DateTime<Utc>> {
        SnapshotFileCache::last_update_time(self).await
    }

    async fn clear(&self) -> Result<(), AppError> {
        SnapshotFileCache::clear(self).await
    }

    async fn size_bytes(&self) -> u64 {
        SnapshotFileCache::size_bytes(self).await
    }

    async fn status(&self) -> CacheStatus {
        SnapshotFileCache::status(self).await
    }
}
