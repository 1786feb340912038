//! イベントAPIのワイヤ形式
//!
//! APIの日時はオフセット無しの `yyyy-MM-ddTHH:mm:ss` で届き、UTC として解釈する。
//! キャッシュ側は RFC 3339 で再エンコードするため、両者はバイト一致しない。

use crate::domain::entities::{City, Event, Sport};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    pub title: String,
    pub sport: Sport,
    pub city: City,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "wire_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(default, with = "wire_datetime::option")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub is_free: bool,
}

impl From<EventDto> for Event {
    fn from(dto: EventDto) -> Self {
        Event {
            id: dto.id,
            title: dto.title,
            sport: dto.sport,
            city: dto.city,
            venue: dto.venue,
            description: dto.description,
            start_date: dto.start_date.and_utc(),
            end_date: dto.end_date.map(|end| end.and_utc()),
            image_url: dto.image_url,
            ticket_url: dto.ticket_url,
            is_free: dto.is_free,
        }
    }
}

impl From<&Event> for EventDto {
    fn from(event: &Event) -> Self {
        EventDto {
            id: event.id.clone(),
            title: event.title.clone(),
            sport: event.sport.clone(),
            city: event.city.clone(),
            venue: event.venue.clone(),
            description: event.description.clone(),
            start_date: event.start_date.naive_utc(),
            end_date: event.end_date.map(|end| end.naive_utc()),
            image_url: event.image_url.clone(),
            ticket_url: event.ticket_url.clone(),
            is_free: event.is_free,
        }
    }
}

pub fn decode_events(body: &[u8]) -> Result<Vec<Event>, serde_json::Error> {
    let dtos: Vec<EventDto> = serde_json::from_slice(body)?;
    Ok(dtos.into_iter().map(Event::from).collect())
}

mod wire_datetime {
    use super::WIRE_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(WIRE_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, WIRE_DATE_FORMAT)
            .map_err(|err| D::Error::custom(format!("invalid date {raw:?}: {err}")))
    }

    pub mod option {
        use super::WIRE_DATE_FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(&value.format(WIRE_DATE_FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => NaiveDateTime::parse_from_str(&raw, WIRE_DATE_FORMAT)
                    .map(Some)
                    .map_err(|err| D::Error::custom(format!("invalid date {raw:?}: {err}"))),
                None => Ok(None),
            }
        }
    }
}
