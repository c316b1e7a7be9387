use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire;

const IMAGE_KEYS: &[&str] = &["thumbMobile", "thumb", "thumbDesktop", "image", "banner", "cover"];

/// Event as embedded in ticket records or returned by the catalog.
///
/// Dates come either as a `dates` array or a single `date`; entries that do
/// not parse are dropped. The first non-empty thumbnail field becomes `image`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct Event {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub dates: Vec<DateTime<Utc>>,
    pub image: Option<String>,
}

impl Event {
    pub fn from_object(obj: &wire::Object) -> Self {
        let dates = match obj.get("dates") {
            Some(Value::Array(values)) if !values.is_empty() => {
                values.iter().filter_map(wire::timestamp).collect()
            }
            _ => obj.get("date").and_then(wire::timestamp).into_iter().collect(),
        };

        Self {
            id: wire::first_id(obj, &["id", "_id"]),
            name: wire::first_text(obj, &["name", "title"]),
            description: wire::text(obj, "description"),
            location: wire::text(obj, "location"),
            dates,
            image: wire::first_text(obj, IMAGE_KEYS),
        }
    }

    /// Latest of the event's dates.
    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.dates.iter().max().copied()
    }

    /// An event without dates never ends.
    pub fn has_ended(&self, now_ms: i64) -> bool {
        self.last_date()
            .map(|last| last.timestamp_millis() < now_ms)
            .unwrap_or(false)
    }
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(obj) => Self::from_object(&obj),
            _ => Self::default(),
        }
    }
}

/// Catalog listing; entries that are not objects are skipped.
pub fn events_from_json(value: Value) -> Vec<Event> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(Event::from_object)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn reads_dates_array_and_skips_garbage() {
        let event: Event = serde_json::from_value(json!({
            "id": 7,
            "name": "Festival",
            "dates": ["2025-05-01T20:00:00Z", "nope", "2025-05-02T20:00:00Z"],
        }))
        .unwrap();

        assert_eq!(event.id.as_deref(), Some("7"));
        assert_eq!(event.dates.len(), 2);
        assert_eq!(
            event.last_date(),
            Some(Utc.with_ymd_and_hms(2025, 5, 2, 20, 0, 0).unwrap())
        );
    }

    #[test]
    fn falls_back_to_single_date() {
        let event = Event::from(json!({"id": "e1", "date": "2025-05-01T20:00:00Z"}));
        assert_eq!(event.dates.len(), 1);
    }

    #[test]
    fn picks_first_available_image() {
        let event = Event::from(json!({"id": "e1", "thumb": "", "banner": "/b.png", "cover": "c.png"}));
        assert_eq!(event.image.as_deref(), Some("/b.png"));
    }

    #[test]
    fn ended_only_when_every_date_is_past() {
        let event = Event::from(json!({
            "dates": ["2025-05-01T20:00:00Z", "2025-05-03T20:00:00Z"],
        }));
        let between = Utc
            .with_ymd_and_hms(2025, 5, 2, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        let after = Utc
            .with_ymd_and_hms(2025, 5, 4, 0, 0, 0)
            .unwrap()
            .timestamp_millis();

        assert!(!event.has_ended(between));
        assert!(event.has_ended(after));
        assert!(!Event::default().has_ended(after));
    }

    #[test]
    fn non_object_payload_degrades_to_default() {
        assert_eq!(Event::from(json!("oops")), Event::default());
        assert!(events_from_json(json!({"data": []})).is_empty());
    }
}
