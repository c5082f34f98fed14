use async_trait::async_trait;

use keepsake_types::{MessageRecord, TimelineRecord};

use crate::error::SyncError;

/// The two record kinds synchronized independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Messages,
    Timeline,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Timeline => "timeline",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform contract for whatever backs the feed. The shipped implementation
/// is [`crate::HttpRemoteSource`]; a different backend plugs in here.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>, SyncError>;

    async fn fetch_timeline(&self) -> Result<Vec<TimelineRecord>, SyncError>;

    /// Reachability probe: fetch one kind and report how many records the
    /// remote currently holds, without touching local storage.
    async fn probe(&self, kind: RecordKind) -> Result<usize, SyncError> {
        match kind {
            RecordKind::Messages => Ok(self.fetch_messages().await?.len()),
            RecordKind::Timeline => Ok(self.fetch_timeline().await?.len()),
        }
    }
}
