use crate::domain::entities::BackgroundUpdate;
use crate::shared::AppError;

/// バックグラウンド更新完了をリスナーへ配る
pub trait RefreshNotifier: Send + Sync {
    fn notify(&self, update: BackgroundUpdate) -> Result<(), AppError>;
}
