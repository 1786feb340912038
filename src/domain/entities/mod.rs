pub mod background_update;
pub mod cache_status;
pub mod event;
pub mod load_result;

pub use background_update::{BACKGROUND_UPDATE_EVENT, BackgroundUpdate};
pub use cache_status::CacheStatus;
pub use event::{City, Event, Sport};
pub use load_result::{Degradation, LoadOutcome, LoadResult};
