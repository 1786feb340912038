pub mod broadcast_refresh_notifier;

pub use broadcast_refresh_notifier::BroadcastRefreshNotifier;
