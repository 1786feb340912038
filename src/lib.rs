pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::EventLoadService;
pub use domain::{BackgroundUpdate, CacheStatus, Event, LoadResult, LoadStrategy};
pub use shared::{AppConfig, AppError};

/// tracing の購読者を設定する。`RUST_LOG` があればそちらを優先
pub fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = if json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    // 二重初期化（テストなど）は無視
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
