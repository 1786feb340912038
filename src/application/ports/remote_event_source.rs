use crate::domain::entities::Event;
use crate::shared::AppError;
use async_trait::async_trait;

/// イベント一覧を配信するリモートAPI
#[async_trait]
pub trait RemoteEventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<Event>, AppError>;
}
