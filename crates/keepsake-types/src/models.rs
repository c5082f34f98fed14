use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Category;

/// A daily message as stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub category: Category,
    pub unlock_date: NaiveDate,
    pub unlocked: bool,
}

/// The content of a message, without local row identity or unlock state.
///
/// This is the unit the sync engine inserts and compares; `id` and `unlocked`
/// never participate in remote equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageRecord {
    pub text: String,
    pub category: Category,
    pub unlock_date: NaiveDate,
}

impl Message {
    pub fn record(&self) -> MessageRecord {
        MessageRecord {
            text: self.text.clone(),
            category: self.category.clone(),
            unlock_date: self.unlock_date,
        }
    }
}

/// A timeline event as stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: i64,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    /// Comma-separated opaque photo paths. Embedded commas are not escaped;
    /// the paths are author-controlled.
    pub photos: String,
    pub category: Category,
}

/// The content of a timeline event, without local row identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub photos: String,
    pub category: Category,
}

impl TimelineEvent {
    pub fn record(&self) -> TimelineRecord {
        TimelineRecord {
            date: self.date,
            title: self.title.clone(),
            description: self.description.clone(),
            photos: self.photos.clone(),
            category: self.category.clone(),
        }
    }

    pub fn photo_paths(&self) -> Vec<&str> {
        split_photos(&self.photos)
    }
}

impl TimelineRecord {
    pub fn photo_paths(&self) -> Vec<&str> {
        split_photos(&self.photos)
    }
}

fn split_photos(photos: &str) -> Vec<&str> {
    if photos.is_empty() {
        return Vec::new();
    }
    photos.split(',').collect()
}
