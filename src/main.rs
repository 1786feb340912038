use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sports_events::application::EventLoadService;
use sports_events::domain::entities::Degradation;
use sports_events::infrastructure::{BroadcastRefreshNotifier, EventSnapshotCache, HttpEventSource};
use sports_events::shared::{AppConfig, SystemClock};
use sports_events::{LoadResult, LoadStrategy, init_logging};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "sports-events")]
#[command(about = "Offline-first sports event loader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the events API
    #[arg(long, env = "SPORTS_EVENTS_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the event cache
    #[arg(long, env = "SPORTS_EVENTS_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load events with the given strategy
    Load {
        /// cache-first, api-first, cache-only or api-only
        #[arg(short, long, default_value_t = LoadStrategy::CacheFirst)]
        strategy: LoadStrategy,

        /// Wait for a scheduled background refresh and print its result
        #[arg(long)]
        wait_refresh: bool,
    },
    /// Show the cache state
    Status,
    /// Remove cached events
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json_logs);

    let mut config = AppConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.cache.cache_dir = cache_dir;
    }
    config
        .validate()
        .map_err(|err| anyhow::anyhow!("Invalid configuration: {err}"))?;
    let cache = EventSnapshotCache::open(&config.cache, Arc::new(SystemClock))
        .await
        .context("Failed to open event cache")?;
    debug!("Using cache file {}", cache.payload_path().display());
    let remote = HttpEventSource::new(&config.api).context("Failed to build HTTP client")?;
    let notifier = BroadcastRefreshNotifier::new();
    let mut updates = notifier.subscribe();

    let service = EventLoadService::new(Arc::new(cache), Arc::new(remote), Arc::new(notifier));

    match cli.command {
        Commands::Load {
            strategy,
            wait_refresh,
        } => {
            let result = service.load(strategy).await?;
            print_result(&result);

            if wait_refresh && result.refresh_scheduled {
                info!("Waiting for background refresh");
                service.wait_for_background_refreshes().await;
                match updates.try_recv() {
                    Ok(update) => {
                        println!(
                            "{}: {} events at {}",
                            update.event_name(),
                            update.events.len(),
                            update.refreshed_at.to_rfc3339()
                        );
                    }
                    Err(_) => println!("Background refresh did not complete"),
                }
            }
        }
        Commands::Status => {
            let status = service.cache_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Clear => {
            service.clear_cache().await?;
            println!("Cache cleared");
        }
    }

    Ok(())
}

fn print_result(result: &LoadResult) {
    match &result.degradation {
        None => println!("source: {}", result.source),
        Some(Degradation::Stale { last_update }) => println!(
            "source: {} (stale, last update {})",
            result.source,
            last_update
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        ),
        Some(Degradation::Fallback { cause, .. }) => {
            println!("source: {} (offline fallback: {})", result.source, cause)
        }
    }
    if result.refresh_scheduled {
        println!("background refresh scheduled");
    }

    for event in &result.events {
        println!(
            "{}  {:<12} {:<16} {}",
            event.start_date.format("%Y-%m-%d %H:%M"),
            event.sport.name,
            event.city.name,
            event.title
        );
    }
}
