pub mod cache;
pub mod http;
pub mod messaging;
pub mod storage;

pub use cache::{EventSnapshotCache, SnapshotFileCache};
pub use http::HttpEventSource;
pub use messaging::BroadcastRefreshNotifier;
pub use storage::PreferenceStore;
