use crate::domain::entities::Event;
use crate::domain::value_objects::DataSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// キャッシュから返した理由の注記
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// 鮮度切れのキャッシュを返した
    Stale {
        last_update: Option<DateTime<Utc>>,
    },
    /// リモート失敗後のフォールバック
    Fallback { cause: String, code: String },
}

/// 画面側が描き分ける終了状態（エラーは `Err` 側）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    Fresh,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadResult {
    pub events: Vec<Event>,
    pub source: DataSource,
    pub degradation: Option<Degradation>,
    /// 裏で再取得を開始したか
    pub refresh_scheduled: bool,
}

impl LoadResult {
    pub fn from_network(events: Vec<Event>) -> Self {
        Self {
            events,
            source: DataSource::Network,
            degradation: None,
            refresh_scheduled: false,
        }
    }

    pub fn from_cache(events: Vec<Event>) -> Self {
        Self {
            events,
            source: DataSource::Cache,
            degradation: None,
            refresh_scheduled: false,
        }
    }

    pub fn stale(events: Vec<Event>, last_update: Option<DateTime<Utc>>) -> Self {
        Self {
            degradation: Some(Degradation::Stale { last_update }),
            ..Self::from_cache(events)
        }
    }

    pub fn fallback(events: Vec<Event>, cause: &crate::shared::AppError) -> Self {
        Self {
            degradation: Some(Degradation::Fallback {
                cause: cause.to_string(),
                code: cause.code().to_string(),
            }),
            ..Self::from_cache(events)
        }
    }

    pub fn with_refresh_scheduled(mut self) -> Self {
        self.refresh_scheduled = true;
        self
    }

    pub fn outcome(&self) -> LoadOutcome {
        if self.degradation.is_some() {
            LoadOutcome::Degraded
        } else {
            LoadOutcome::Fresh
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.outcome() == LoadOutcome::Degraded
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.degradation, Some(Degradation::Fallback { .. }))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.degradation, Some(Degradation::Stale { .. }))
    }
}
