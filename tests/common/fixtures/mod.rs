use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use sports_events::domain::{City, Event, Sport};
use sports_events::shared::ApiConfig;
use tokio::net::TcpListener;

pub const EVENTS_PATH: &str = "/api/events";

pub fn sample_events(prefix: &str, count: usize) -> Vec<Event> {
    (0..count)
        .map(|i| {
            Event::new(
                format!("{prefix}-{i}"),
                format!("{prefix} match {i}"),
                Sport::new("football", "Football"),
                City::new("madrid", "Madrid"),
                Utc.with_ymd_and_hms(2024, 9, 21, 11, i as u32 % 60, 0)
                    .unwrap(),
            )
        })
        .collect()
}

/// APIが返す形の一覧（日時はオフセット無し）
pub fn wire_events(prefix: &str, count: usize) -> Value {
    let events: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("{prefix}-{i}"),
                "title": format!("{prefix} match {i}"),
                "sport": { "id": "football", "name": "Football", "icon": null },
                "city": { "id": "madrid", "name": "Madrid", "country": "ES" },
                "venue": "Estadio",
                "startDate": format!("2024-09-21T11:{:02}:00", i % 60),
                "endDate": null,
                "isFree": i % 2 == 0
            })
        })
        .collect();
    Value::Array(events)
}

struct ApiState {
    hits: AtomicUsize,
    status: Mutex<StatusCode>,
    body: Mutex<Value>,
}

/// `GET /api/events` だけを持つモックAPI
pub struct MockEventsApi {
    pub base_url: String,
    state: Arc<ApiState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockEventsApi {
    pub async fn start(body: Value) -> Self {
        let state = Arc::new(ApiState {
            hits: AtomicUsize::new(0),
            status: Mutex::new(StatusCode::OK),
            body: Mutex::new(body),
        });
        let app = Router::new()
            .route(EVENTS_PATH, get(list_events))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind events mock");
        let addr = listener.local_addr().expect("events mock addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve events mock");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            ..ApiConfig::default()
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn respond_with(&self, body: Value) {
        *self.state.status.lock().unwrap() = StatusCode::OK;
        *self.state.body.lock().unwrap() = body;
    }

    pub fn fail_with(&self, status: StatusCode) {
        *self.state.status.lock().unwrap() = status;
    }
}

impl Drop for MockEventsApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list_events(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let status = *state.status.lock().unwrap();
    if !status.is_success() {
        return (status, Json(json!({ "error": "unavailable" })));
    }
    let body = state.body.lock().unwrap().clone();
    (status, Json(body))
}
