use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::engine::{SyncEngine, SyncOutcome};
use crate::error::SyncError;
use crate::remote::{RecordKind, RemoteSource};

/// Progress notifications for anyone watching a sync.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Started { kind: RecordKind },
    Completed { kind: RecordKind, changed: usize },
    Failed { kind: RecordKind, message: String },
}

struct SyncRequest {
    kind: RecordKind,
    reply: oneshot::Sender<Result<SyncOutcome, SyncError>>,
}

/// Owns the background worker that processes sync requests serially.
///
/// One request is in flight at a time, so two callers asking for the same
/// kind can never race a delete+reinsert against each other. The worker exits
/// when every handle has been dropped.
pub struct SyncService;

impl SyncService {
    pub fn spawn<S>(engine: SyncEngine<S>) -> SyncHandle
    where
        S: RemoteSource + 'static,
    {
        let (request_tx, mut request_rx) = mpsc::channel::<SyncRequest>(16);
        let (event_tx, _) = broadcast::channel(64);
        let events = event_tx.clone();

        tokio::spawn(async move {
            while let Some(SyncRequest { kind, reply }) = request_rx.recv().await {
                let _ = event_tx.send(SyncEvent::Started { kind });

                let result = engine.sync(kind).await;
                match &result {
                    Ok(outcome) => {
                        let _ = event_tx.send(SyncEvent::Completed {
                            kind,
                            changed: outcome.changed,
                        });
                    }
                    Err(e) => {
                        let _ = event_tx.send(SyncEvent::Failed {
                            kind,
                            message: e.to_string(),
                        });
                    }
                }

                // Caller may have given up; the outcome is already stored.
                let _ = reply.send(result);
            }
            info!("Sync worker stopped");
        });

        SyncHandle { request_tx, events }
    }
}

/// Cheaply cloneable handle for submitting sync requests and watching events.
#[derive(Clone)]
pub struct SyncHandle {
    request_tx: mpsc::Sender<SyncRequest>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncHandle {
    /// Queue a sync for one kind and wait for its outcome.
    pub async fn request(&self, kind: RecordKind) -> Result<SyncOutcome, SyncError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        debug!("Queueing {} sync", kind);

        self.request_tx
            .send(SyncRequest {
                kind,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SyncError::Unknown("sync worker stopped".to_string()))?;

        reply_rx
            .await
            .map_err(|_| SyncError::Unknown("sync worker stopped".to_string()))?
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }
}
