use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sport {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
}

/// スポーツイベント
///
/// キャッシュにはこの形のまま保存される（日時は RFC 3339）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub sport: Sport,
    pub city: City,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub ticket_url: Option<String>,
    pub is_free: bool,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        sport: Sport,
        city: City,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sport,
            city,
            venue: None,
            description: None,
            start_date,
            end_date: None,
            image_url: None,
            ticket_url: None,
            is_free: false,
        }
    }
}

impl Sport {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
        }
    }
}

impl City {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: None,
        }
    }
}
