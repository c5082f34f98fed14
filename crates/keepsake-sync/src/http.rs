use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use keepsake_types::{Category, MessageRecord, TimelineRecord, normalize_date};

use crate::error::SyncError;
use crate::remote::RemoteSource;

const MESSAGES_ENDPOINT: &str = "messages.json";
const TIMELINE_ENDPOINT: &str = "timeline.json";

/// 10 s to connect, 10 s for the whole request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote source backed by a static JSON feed (e.g. GitHub Pages).
///
/// Each kind lives at a fixed endpoint under the base URL. The document is
/// either a bare JSON array or an object wrapping the array under a named
/// field. Entries missing required fields are skipped with a warning rather
/// than failing the whole fetch.
pub struct HttpRemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .connect_timeout(HTTP_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Unknown(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_document(&self, endpoint: &str) -> Result<Value, SyncError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Fetching {}", url);

        let resp = self.client.get(&url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(SyncError::Unknown(format!(
                "HTTP {} from {}",
                resp.status(),
                url
            )));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>, SyncError> {
        let doc = self.fetch_document(MESSAGES_ENDPOINT).await?;
        parse_messages(doc)
    }

    async fn fetch_timeline(&self) -> Result<Vec<TimelineRecord>, SyncError> {
        let doc = self.fetch_document(TIMELINE_ENDPOINT).await?;
        parse_timeline(doc)
    }
}

/// Accept either `[ ... ]` or `{ "<field>": [ ... ] }`.
fn unwrap_array(doc: Value, field: &str) -> Result<Vec<Value>, SyncError> {
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SyncError::MalformedResponse(format!(
                "expected an array or an object with a \"{field}\" array"
            ))),
        },
        _ => Err(SyncError::MalformedResponse(
            "expected a JSON array or object".to_string(),
        )),
    }
}

fn parse_messages(doc: Value) -> Result<Vec<MessageRecord>, SyncError> {
    let items = unwrap_array(doc, "messages")?;
    let mut records = Vec::with_capacity(items.len());

    for item in &items {
        match parse_message(item) {
            Some(record) => records.push(record),
            None => warn!("Skipping incomplete message entry: {}", item),
        }
    }

    Ok(records)
}

fn parse_message(item: &Value) -> Option<MessageRecord> {
    let date = item.get("date")?.as_str()?;
    let text = item.get("message")?.as_str()?;
    // Older feed revisions used "type"; newer ones "messageType".
    let tag = item
        .get("messageType")
        .and_then(Value::as_str)
        .or_else(|| item.get("type").and_then(Value::as_str))
        .unwrap_or("love_note");

    Some(MessageRecord {
        text: text.to_string(),
        category: Category::parse(tag),
        unlock_date: normalize_date(date)?,
    })
}

fn parse_timeline(doc: Value) -> Result<Vec<TimelineRecord>, SyncError> {
    let items = unwrap_array(doc, "timeline_events")?;
    let mut records = Vec::with_capacity(items.len());

    for item in &items {
        match parse_event(item) {
            Some(record) => records.push(record),
            None => warn!("Skipping incomplete timeline entry: {}", item),
        }
    }

    Ok(records)
}

fn parse_event(item: &Value) -> Option<TimelineRecord> {
    let date = item.get("date")?.as_str()?;
    let tag = item.get("type")?.as_str()?;
    let title = item.get("title")?.as_str()?;
    let description = item.get("description")?.as_str()?;
    let photos = item.get("photos").and_then(Value::as_str).unwrap_or("");

    Some(TimelineRecord {
        date: normalize_date(date)?,
        title: title.to_string(),
        description: description.to_string(),
        photos: photos.to_string(),
        category: Category::parse(tag),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn parses_bare_message_array() {
        let doc = json!([
            {"date": "2025-09-03T10:30:00Z", "messageType": "gratitude", "message": "thanks"}
        ]);
        let records = parse_messages(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "thanks");
        assert_eq!(records[0].category, Category::Gratitude);
        assert_eq!(
            records[0].unlock_date,
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
        );
    }

    #[test]
    fn parses_wrapped_message_object() {
        let doc = json!({"messages": [
            {"date": "2024-01-01", "type": "memory", "message": "remember"}
        ]});
        let records = parse_messages(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, Category::Memory);
    }

    #[test]
    fn message_type_falls_back_to_love_note() {
        let doc = json!([{"date": "2024-01-01", "message": "untyped"}]);
        let records = parse_messages(doc).unwrap();
        assert_eq!(records[0].category, Category::LoveNote);
    }

    #[test]
    fn message_type_prefers_message_type_over_type() {
        let doc = json!([
            {"date": "2024-01-01", "messageType": "sweet", "type": "memory", "message": "x"}
        ]);
        let records = parse_messages(doc).unwrap();
        assert_eq!(records[0].category, Category::Sweet);
    }

    #[test]
    fn incomplete_messages_are_skipped() {
        let doc = json!([
            {"date": "2024-01-01", "message": "kept"},
            {"date": "2024-01-02"},
            {"message": "no date"},
            {"date": "never", "message": "bad date"}
        ]);
        let records = parse_messages(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "kept");
    }

    #[test]
    fn parses_timeline_with_optional_photos() {
        let doc = json!({"timeline_events": [
            {"date": "2024-01-01", "type": "milestone", "title": "First Date",
             "description": "where it started", "photos": "a.jpg,b.jpg"},
            {"date": "2024-02-14", "type": "holiday", "title": "Valentine's",
             "description": ""}
        ]});
        let records = parse_timeline(doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].photo_paths(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(records[1].photos, "");
    }

    #[test]
    fn timeline_requires_description() {
        let doc = json!([
            {"date": "2024-01-01", "type": "milestone", "title": "No description"}
        ]);
        let records = parse_timeline(doc).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn unknown_category_lands_in_other() {
        let doc = json!([
            {"date": "2024-01-01", "type": "road_trip", "title": "Coast drive",
             "description": "long one"}
        ]);
        let records = parse_timeline(doc).unwrap();
        assert_eq!(records[0].category, Category::Other("road_trip".to_string()));
    }

    #[test]
    fn non_array_document_is_malformed() {
        assert!(matches!(
            parse_messages(json!("nope")),
            Err(SyncError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_timeline(json!({"wrong_field": []})),
            Err(SyncError::MalformedResponse(_))
        ));
    }
}
