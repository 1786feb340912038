mod common;

use std::sync::Arc;

use common::fixtures::sample_events;
use common::mocks::remote_never_called;
use common::{CacheContext, start_time};
use sports_events::application::EventLoadService;
use sports_events::domain::LoadStrategy;
use sports_events::infrastructure::BroadcastRefreshNotifier;

#[tokio::test]
async fn instances_on_one_directory_agree_on_payload_and_timestamp() {
    let ctx = CacheContext::new().await;
    ctx.cache.save(&sample_events("first", 3)).await.unwrap();
    let other = ctx.reopen().await;

    ctx.clock.advance(chrono::Duration::hours(2));
    let latest = sample_events("second", 4);
    ctx.cache.save(&latest).await.unwrap();

    let written_at = start_time() + chrono::Duration::hours(2);
    assert_eq!(ctx.cache.last_update_time().await, Some(written_at));
    assert_eq!(other.last_update_time().await, Some(written_at));
    assert_eq!(other.load().await.unwrap(), Some(latest));
    assert!(other.is_fresh().await);
    assert_eq!(other.status().await, ctx.cache.status().await);
}

#[tokio::test]
async fn instance_opened_before_first_save_sees_the_snapshot() {
    let ctx = CacheContext::new().await;
    let early = ctx.reopen().await;
    assert_eq!(early.load().await.unwrap(), None);

    let events = sample_events("league", 2);
    ctx.cache.save(&events).await.unwrap();

    assert_eq!(early.load().await.unwrap(), Some(events));
    assert_eq!(early.last_update_time().await, Some(start_time()));
}

#[tokio::test]
async fn clear_through_one_instance_empties_the_other() {
    let ctx = CacheContext::new().await;
    let other = ctx.reopen().await;
    other.save(&sample_events("league", 2)).await.unwrap();

    ctx.cache.clear().await.unwrap();

    assert_eq!(other.load().await.unwrap(), None);
    assert!(other.last_update_time().await.is_none());
    assert!(!other.status().await.has_snapshot);
}

#[tokio::test]
async fn cache_only_load_reads_snapshot_written_by_another_instance() {
    let ctx = CacheContext::new().await;
    let service = EventLoadService::new(
        ctx.cache.clone(),
        Arc::new(remote_never_called()),
        Arc::new(BroadcastRefreshNotifier::new()),
    );

    let writer = ctx.reopen().await;
    writer.save(&sample_events("league", 5)).await.unwrap();

    let result = service.load(LoadStrategy::CacheOnly).await.unwrap();
    assert_eq!(result.events.len(), 5);
    assert!(!result.is_degraded());
}
