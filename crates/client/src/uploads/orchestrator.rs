//! Upload flow orchestration.
//!
//! Drives one batch at a time through `Idle → Selecting → Confirming →
//! Uploading → Idle`. An oversized selection takes the rejected branch
//! before any request is made. Selecting a new batch tears the previous
//! flow down first (cancellation token plus task abort), so at most one
//! flow is ever active and only the newest subscription is honored.

use std::path::PathBuf;
use std::sync::Arc;

use api::models::FileInfo;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::transport::{FileTransport, TransportError};

use super::batch::{BatchError, UploadBatch};
use super::broadcaster::UploadBroadcaster;

/// Per-flow progress channel capacity; a full batch emits at most
/// `2 + MAX_BATCH_FILES` events, so senders never block.
const EVENT_CAPACITY: usize = 32;

/// Phase of the upload flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    /// No flow in progress.
    #[default]
    Idle,
    /// The user is picking files.
    Selecting,
    /// A validated batch awaits confirmation.
    Confirming,
    /// The confirmed batch is uploading in the background.
    Uploading,
}

/// Progress events emitted while a confirmed batch uploads.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Upload of the batch has started.
    Started {
        /// Files in the batch.
        total: usize,
    },
    /// One file was stored by the backend.
    Stored {
        /// Zero-based position within the batch.
        index: usize,
        /// Files in the batch.
        total: usize,
        /// The stored record.
        info: FileInfo,
    },
    /// One file failed; the rest of the batch continues.
    Failed {
        /// Zero-based position within the batch.
        index: usize,
        /// Files in the batch.
        total: usize,
        /// The local path that failed.
        path: PathBuf,
        /// Rendered failure reason.
        error: String,
    },
    /// The batch is done.
    Finished {
        /// Files the backend stored.
        stored: usize,
        /// Files in the batch.
        total: usize,
    },
}

/// An in-flight upload flow.
struct ActiveFlow {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Orchestrates the upload flow, one batch at a time.
pub struct UploadOrchestrator {
    transport: Arc<FileTransport>,
    broadcaster: UploadBroadcaster,
    phase: UploadPhase,
    pending: Option<UploadBatch>,
    active: Option<ActiveFlow>,
}

impl UploadOrchestrator {
    /// Creates an orchestrator uploading through `transport` and publishing
    /// stored records to `broadcaster`.
    pub fn new(transport: Arc<FileTransport>, broadcaster: UploadBroadcaster) -> Self {
        Self {
            transport,
            broadcaster,
            phase: UploadPhase::Idle,
            pending: None,
            active: None,
        }
    }

    /// Current phase of the flow.
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// The completion stream stored records are published to.
    pub fn broadcaster(&self) -> &UploadBroadcaster {
        &self.broadcaster
    }

    /// Whether a confirmed batch is still uploading.
    pub fn has_active_flow(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|flow| !flow.handle.is_finished())
    }

    /// Enters the picking phase. A running upload keeps going until a new
    /// batch is actually selected.
    pub fn begin_selecting(&mut self) {
        self.pending = None;
        self.phase = UploadPhase::Selecting;
    }

    /// Validates a selection into the pending batch and enters Confirming.
    ///
    /// Validation comes first: an oversized or empty selection is rejected
    /// outright and the previous flow, if any, keeps running. On success
    /// the previous flow is torn down; only the newest batch may live.
    pub fn select(
        &mut self,
        paths: Vec<PathBuf>,
        overwrite: bool,
    ) -> Result<&UploadBatch, BatchError> {
        let batch = UploadBatch::new(paths)?.with_overwrite(overwrite);

        self.teardown();
        debug!(files = batch.len(), "batch selected, awaiting confirmation");
        self.phase = UploadPhase::Confirming;
        Ok(self.pending.insert(batch))
    }

    /// Drops the pending batch without uploading (the user declined).
    pub fn dismiss(&mut self) {
        self.pending = None;
        self.phase = UploadPhase::Idle;
    }

    /// Starts uploading the pending batch in the background.
    ///
    /// Returns the progress event stream, or `None` when no batch awaits
    /// confirmation. Stored records additionally fan out through the
    /// broadcaster.
    pub fn confirm(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        let batch = self.pending.take()?;
        let (events, rx) = mpsc::channel(EVENT_CAPACITY);

        let cancel = CancellationToken::new();
        let transport = Arc::clone(&self.transport);
        let broadcaster = self.broadcaster.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            run_batch(transport, broadcaster, batch, events, token).await;
        });

        self.active = Some(ActiveFlow { cancel, handle });
        self.phase = UploadPhase::Uploading;
        Some(rx)
    }

    /// Returns the flow to Idle after the UI observed
    /// [`UploadEvent::Finished`].
    ///
    /// A flow the user already re-entered (Selecting/Confirming) is left
    /// where it is.
    pub fn finish(&mut self) {
        self.active = None;
        if self.phase == UploadPhase::Uploading {
            self.phase = UploadPhase::Idle;
        }
    }

    /// Tears down the active flow and pending batch, returning to Idle.
    pub fn teardown(&mut self) {
        if let Some(flow) = self.active.take() {
            debug!("tearing down previous upload flow");
            flow.cancel.cancel();
            flow.handle.abort();
        }
        self.pending = None;
        self.phase = UploadPhase::Idle;
    }
}

impl Drop for UploadOrchestrator {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Uploads every file of the batch in order, publishing stored records and
/// reporting progress until done or cancelled.
async fn run_batch(
    transport: Arc<FileTransport>,
    broadcaster: UploadBroadcaster,
    batch: UploadBatch,
    events: mpsc::Sender<UploadEvent>,
    cancel: CancellationToken,
) {
    let total = batch.len();
    let _ = events.send(UploadEvent::Started { total }).await;

    let mut stored = 0;
    for (index, path) in batch.paths().iter().enumerate() {
        let upload = transport.upload(path, batch.overwrite());
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = upload => result,
        };

        match result {
            Ok(info) => {
                stored += 1;
                broadcaster.publish(info.clone());
                let _ = events
                    .send(UploadEvent::Stored { index, total, info })
                    .await;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "upload failed");
                let fatal = matches!(err, TransportError::AuthRequired);
                let _ = events
                    .send(UploadEvent::Failed {
                        index,
                        total,
                        path: path.clone(),
                        error: err.to_string(),
                    })
                    .await;
                // The rest of the batch would fail the same way.
                if fatal {
                    break;
                }
            }
        }
    }

    let _ = events.send(UploadEvent::Finished { stored, total }).await;
}
