use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use keepsake_db::Database;
use keepsake_types::MessageRecord;

use crate::connectivity::{AssumeOnline, Connectivity};
use crate::error::SyncError;
use crate::remote::{RecordKind, RemoteSource};

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one successful sync. `changed` counts the records written during
/// a replacement, 0 when the remote was empty or matched the local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub kind: RecordKind,
    pub changed: usize,
}

/// Outcome of syncing both kinds independently; one kind failing never stops
/// the other.
#[derive(Debug)]
pub struct SyncReport {
    pub messages: Result<SyncOutcome, SyncError>,
    pub timeline: Result<SyncOutcome, SyncError>,
}

impl SyncReport {
    pub fn total_changed(&self) -> usize {
        [&self.messages, &self.timeline]
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|o| o.changed)
            .sum()
    }

    pub fn fully_succeeded(&self) -> bool {
        self.messages.is_ok() && self.timeline.is_ok()
    }
}

/// Reconciles the local store with one fetch from the remote source.
///
/// The remote is authoritative: any difference replaces the local table
/// wholesale (atomically). An empty remote list is "nothing to report", never
/// "delete everything".
pub struct SyncEngine<S> {
    db: Arc<Database>,
    source: S,
    connectivity: Arc<dyn Connectivity>,
    timeout: Duration,
}

impl<S: RemoteSource> SyncEngine<S> {
    pub fn new(db: Arc<Database>, source: S) -> Self {
        Self {
            db,
            source,
            connectivity: Arc::new(AssumeOnline),
            timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn sync(&self, kind: RecordKind) -> Result<SyncOutcome, SyncError> {
        self.sync_with_cancel(kind, CancellationToken::new()).await
    }

    /// Sync one kind, abandoning the fetch if `cancel` fires. An abandoned
    /// fetch cannot write behind the caller's back.
    pub async fn sync_with_cancel(
        &self,
        kind: RecordKind,
        cancel: CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        if !self.connectivity.is_online() {
            warn!("Offline - skipping {} sync", kind);
            return Err(SyncError::NoConnectivity);
        }

        match kind {
            RecordKind::Messages => self.sync_messages(&cancel).await,
            RecordKind::Timeline => self.sync_timeline(&cancel).await,
        }
    }

    /// Sync both kinds, tolerating per-kind failure.
    pub async fn sync_all(&self) -> SyncReport {
        let messages = self.sync(RecordKind::Messages).await;
        if let Err(e) = &messages {
            warn!("Could not sync messages: {}", e);
        }

        let timeline = self.sync(RecordKind::Timeline).await;
        if let Err(e) = &timeline {
            warn!("Could not sync timeline: {}", e);
        }

        SyncReport { messages, timeline }
    }

    async fn sync_messages(&self, cancel: &CancellationToken) -> Result<SyncOutcome, SyncError> {
        let kind = RecordKind::Messages;

        let db = self.db.clone();
        let local = run_blocking(move || db.all_messages()).await?;

        let remote = self.guarded(self.source.fetch_messages(), cancel).await?;

        if remote.is_empty() {
            info!("Remote messages list is empty - keeping local data");
            return Ok(SyncOutcome { kind, changed: 0 });
        }

        let local_records: Vec<MessageRecord> = local.iter().map(|m| m.record()).collect();
        if multiset_equal(&local_records, &remote) {
            return Ok(SyncOutcome { kind, changed: 0 });
        }

        let db = self.db.clone();
        let inserted = run_blocking(move || db.replace_all_messages(&remote)).await?;
        info!("Messages replaced ({} records)", inserted);
        Ok(SyncOutcome {
            kind,
            changed: inserted,
        })
    }

    async fn sync_timeline(&self, cancel: &CancellationToken) -> Result<SyncOutcome, SyncError> {
        let kind = RecordKind::Timeline;

        let db = self.db.clone();
        let local = run_blocking(move || db.all_timeline_events()).await?;

        let remote = self.guarded(self.source.fetch_timeline(), cancel).await?;

        if remote.is_empty() {
            info!("Remote timeline list is empty - keeping local data");
            return Ok(SyncOutcome { kind, changed: 0 });
        }

        let local_records: Vec<_> = local.iter().map(|e| e.record()).collect();
        if multiset_equal(&local_records, &remote) {
            return Ok(SyncOutcome { kind, changed: 0 });
        }

        let db = self.db.clone();
        let inserted = run_blocking(move || db.replace_all_timeline_events(&remote)).await?;
        info!("Timeline replaced ({} records)", inserted);
        Ok(SyncOutcome {
            kind,
            changed: inserted,
        })
    }

    /// Race a fetch against the sync timeout and the cancellation token.
    async fn guarded<T>(
        &self,
        fetch: impl Future<Output = Result<T, SyncError>>,
        cancel: &CancellationToken,
    ) -> Result<T, SyncError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(SyncError::Timeout),
            result = tokio::time::timeout(self.timeout, fetch) => match result {
                Ok(inner) => inner,
                Err(_) => Err(SyncError::Timeout),
            },
        }
    }
}

/// Run a rusqlite call off the async runtime.
async fn run_blocking<T: Send + 'static>(
    f: impl FnOnce() -> anyhow::Result<T> + Send + 'static,
) -> Result<T, SyncError> {
    task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::Unknown(format!("blocking task failed: {e}")))?
        .map_err(SyncError::from)
}

/// Order-independent full-field comparison, duplicates counted.
fn multiset_equal<T: Ord + Clone>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use keepsake_types::{Category, TimelineRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        messages: Vec<MessageRecord>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(messages: Vec<MessageRecord>) -> Self {
            Self {
                messages,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteSource for StaticSource {
        async fn fetch_messages(&self) -> Result<Vec<MessageRecord>, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.messages.clone())
        }

        async fn fetch_timeline(&self) -> Result<Vec<TimelineRecord>, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct StalledSource;

    #[async_trait]
    impl RemoteSource for StalledSource {
        async fn fetch_messages(&self) -> Result<Vec<MessageRecord>, SyncError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        async fn fetch_timeline(&self) -> Result<Vec<TimelineRecord>, SyncError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    struct Offline;

    impl Connectivity for Offline {
        fn is_online(&self) -> bool {
            false
        }
    }

    fn record(text: &str, day: u32) -> MessageRecord {
        MessageRecord {
            text: text.to_string(),
            category: Category::LoveNote,
            unlock_date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        }
    }

    #[test]
    fn multiset_comparison_ignores_order_not_duplicates() {
        let a = vec![record("x", 1), record("y", 2)];
        let b = vec![record("y", 2), record("x", 1)];
        assert!(multiset_equal(&a, &b));

        let with_dup = vec![record("x", 1), record("x", 1)];
        assert!(!multiset_equal(&a, &with_dup));
    }

    #[tokio::test]
    async fn offline_short_circuits_without_fetching() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let source = StaticSource::new(vec![record("unreachable", 1)]);
        let engine = SyncEngine::new(db.clone(), source).with_connectivity(Arc::new(Offline));

        let err = engine.sync(RecordKind::Messages).await.unwrap_err();
        assert!(matches!(err, SyncError::NoConnectivity));
        assert_eq!(engine.source.calls.load(Ordering::SeqCst), 0);
        assert!(db.all_messages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_remote_leaves_local_data_alone() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.insert_message(&record("survives", 1)).unwrap();

        let engine = SyncEngine::new(db.clone(), StaticSource::new(Vec::new()));
        let outcome = engine.sync(RecordKind::Messages).await.unwrap();

        assert_eq!(outcome.changed, 0);
        assert_eq!(db.all_messages().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stalled_fetch_times_out() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.insert_message(&record("survives", 1)).unwrap();

        let engine =
            SyncEngine::new(db.clone(), StalledSource).with_timeout(Duration::from_millis(50));
        let err = engine.sync(RecordKind::Messages).await.unwrap_err();

        assert!(matches!(err, SyncError::Timeout));
        assert_eq!(db.all_messages().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_abandons_the_fetch() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let engine = SyncEngine::new(db, StalledSource);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine
            .sync_with_cancel(RecordKind::Messages, cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Timeout));
    }
}
