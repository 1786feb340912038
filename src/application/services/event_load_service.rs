use crate::application::ports::{EventCache, RefreshNotifier, RemoteEventSource};
use crate::domain::entities::{BackgroundUpdate, CacheStatus, Event, LoadResult};
use crate::domain::value_objects::LoadStrategy;
use crate::shared::{AppError, Clock, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// キャッシュとリモートを戦略に従って使い分ける読み込みの入口
///
/// 呼び出しをまたぐ状態はキャッシュ側にしか持たない。
/// 保持するのはバックグラウンド更新のタスクハンドルだけで、ログと待ち合わせに使う。
pub struct EventLoadService {
    cache: Arc<dyn EventCache>,
    remote: Arc<dyn RemoteEventSource>,
    notifier: Arc<dyn RefreshNotifier>,
    clock: Arc<dyn Clock>,
    background_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EventLoadService {
    pub fn new(
        cache: Arc<dyn EventCache>,
        remote: Arc<dyn RemoteEventSource>,
        notifier: Arc<dyn RefreshNotifier>,
    ) -> Self {
        Self {
            cache,
            remote,
            notifier,
            clock: Arc::new(SystemClock),
            background_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn load(&self, strategy: LoadStrategy) -> Result<LoadResult, AppError> {
        tracing::debug!("Loading events ({})", strategy);
        match strategy {
            LoadStrategy::CacheFirst => self.load_cache_first().await,
            LoadStrategy::ApiFirst => self.load_api_first().await,
            LoadStrategy::CacheOnly => self.load_cache_only().await,
            LoadStrategy::ApiOnly => self.load_api_only().await,
        }
    }

    /// 明示的な再取得（api-only と同じ）
    pub async fn refresh(&self) -> Result<LoadResult, AppError> {
        self.load(LoadStrategy::ApiOnly).await
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }

    pub async fn clear_cache(&self) -> Result<(), AppError> {
        self.cache.clear().await
    }

    /// 実行中のバックグラウンド更新の数
    pub fn pending_background_refreshes(&self) -> usize {
        let mut tasks = self.lock_tasks();
        tasks.retain(|handle| !handle.is_finished());
        tasks.len()
    }

    /// 起動済みのバックグラウンド更新がすべて終わるまで待つ
    pub async fn wait_for_background_refreshes(&self) {
        loop {
            let handles = std::mem::take(&mut *self.lock_tasks());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    tracing::warn!("Background refresh task ended abnormally: {}", err);
                }
            }
        }
    }

    async fn load_cache_first(&self) -> Result<LoadResult, AppError> {
        if let Some(events) = self.read_cache().await {
            if self.cache.is_fresh().await {
                tracing::debug!("Serving {} events from fresh cache", events.len());
                return Ok(LoadResult::from_cache(events));
            }

            let last_update = self.cache.last_update_time().await;
            tracing::info!(
                "Serving {} events from stale cache, refreshing in background",
                events.len()
            );
            self.spawn_background_refresh();
            return Ok(LoadResult::stale(events, last_update).with_refresh_scheduled());
        }

        tracing::debug!("Cache empty, fetching from remote");
        let events = self.fetch_and_store().await?;
        Ok(LoadResult::from_network(events))
    }

    async fn load_api_first(&self) -> Result<LoadResult, AppError> {
        let err = match self.fetch_and_store().await {
            Ok(events) => return Ok(LoadResult::from_network(events)),
            Err(err) => err,
        };

        tracing::warn!("Remote fetch failed, falling back to cache: {}", err);
        match self.read_cache().await {
            Some(events) => Ok(LoadResult::fallback(events, &err)),
            None => {
                tracing::warn!("No cached events to fall back to");
                Err(AppError::NoDataAvailable)
            }
        }
    }

    async fn load_cache_only(&self) -> Result<LoadResult, AppError> {
        let Some(events) = self.read_cache().await else {
            return Err(AppError::NoCacheAvailable);
        };

        if self.cache.is_fresh().await {
            Ok(LoadResult::from_cache(events))
        } else {
            let last_update = self.cache.last_update_time().await;
            Ok(LoadResult::stale(events, last_update))
        }
    }

    async fn load_api_only(&self) -> Result<LoadResult, AppError> {
        let events = self.fetch_and_store().await?;
        Ok(LoadResult::from_network(events))
    }

    /// リモートから取得してキャッシュに書き戻す。書き込み失敗は結果に影響しない
    async fn fetch_and_store(&self) -> Result<Vec<Event>, AppError> {
        let events = self.remote.fetch_events().await?;
        if let Err(err) = self.cache.save(&events).await {
            tracing::warn!("Failed to cache fetched events: {}", err);
        }
        Ok(events)
    }

    /// 読めないキャッシュは空として扱う
    async fn read_cache(&self) -> Option<Vec<Event>> {
        match self.cache.load().await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!("Treating unreadable cache as empty: {}", err);
                None
            }
        }
    }

    fn spawn_background_refresh(&self) {
        let cache = Arc::clone(&self.cache);
        let remote = Arc::clone(&self.remote);
        let notifier = Arc::clone(&self.notifier);
        let clock = Arc::clone(&self.clock);

        let handle = tokio::spawn(
            Self::refresh_in_background(cache, remote, notifier, clock)
                .instrument(tracing::info_span!("background_refresh")),
        );

        let mut tasks = self.lock_tasks();
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(handle);
        tracing::debug!("Background refresh spawned ({} in flight)", tasks.len());
    }

    async fn refresh_in_background(
        cache: Arc<dyn EventCache>,
        remote: Arc<dyn RemoteEventSource>,
        notifier: Arc<dyn RefreshNotifier>,
        clock: Arc<dyn Clock>,
    ) {
        // 失敗しても再試行しない。次の load が再試行の機会
        let events = match remote.fetch_events().await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!("Background refresh failed: {}", err);
                return;
            }
        };

        if let Err(err) = cache.save(&events).await {
            tracing::warn!("Background refresh could not update cache: {}", err);
        }

        let count = events.len();
        if let Err(err) = notifier.notify(BackgroundUpdate::new(events, clock.now())) {
            tracing::warn!("Failed to publish background update: {}", err);
            return;
        }
        tracing::info!("Background refresh completed with {} events", count);
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.background_tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
