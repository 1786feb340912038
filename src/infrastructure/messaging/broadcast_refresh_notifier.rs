use tokio::sync::broadcast;

use crate::application::ports::RefreshNotifier;
use crate::domain::entities::BackgroundUpdate;
use crate::shared::AppError;

const DEFAULT_CAPACITY: usize = 16;

/// プロセス内のリスナーへ更新完了を配る通知チャネル
///
/// 永続化や再送はしない。購読していなかったリスナーは取りこぼす。
#[derive(Clone)]
pub struct BroadcastRefreshNotifier {
    sender: broadcast::Sender<BackgroundUpdate>,
}

impl BroadcastRefreshNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 受信側をドロップすると購読解除になる
    pub fn subscribe(&self) -> broadcast::Receiver<BackgroundUpdate> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastRefreshNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshNotifier for BroadcastRefreshNotifier {
    fn notify(&self, update: BackgroundUpdate) -> Result<(), AppError> {
        let count = update.events.len();
        match self.sender.send(update) {
            Ok(listeners) => {
                tracing::debug!(
                    "Delivered background update ({} events) to {} listeners",
                    count,
                    listeners
                );
            }
            Err(_) => {
                tracing::debug!("No listeners for background update");
            }
        }
        Ok(())
    }
}
