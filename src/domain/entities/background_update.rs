use crate::domain::entities::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BACKGROUND_UPDATE_EVENT: &str = "events:background-update-completed";

/// バックグラウンド更新の完了通知
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackgroundUpdate {
    pub events: Vec<Event>,
    pub refreshed_at: DateTime<Utc>,
}

impl BackgroundUpdate {
    pub fn new(events: Vec<Event>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            events,
            refreshed_at,
        }
    }

    pub fn event_name(&self) -> &'static str {
        BACKGROUND_UPDATE_EVENT
    }
}
