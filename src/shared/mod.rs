pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiConfig, AppConfig, CacheConfig};
pub use error::{AppError, Result};
