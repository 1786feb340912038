pub mod event_cache;
pub mod refresh_notifier;
pub mod remote_event_source;

pub use event_cache::EventCache;
pub use refresh_notifier::RefreshNotifier;
pub use remote_event_source::RemoteEventSource;
