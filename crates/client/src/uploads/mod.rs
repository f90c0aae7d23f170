//! Upload flow: batch selection, orchestration, and the shared completion
//! stream.
//!
//! One batch at a time moves through selection, confirmation, and upload;
//! completed records fan out to the dashboard through the broadcaster.

mod batch;
mod broadcaster;
mod orchestrator;

pub use batch::{BatchError, UploadBatch, MAX_BATCH_FILES};
pub use broadcaster::UploadBroadcaster;
pub use orchestrator::{UploadEvent, UploadOrchestrator, UploadPhase};
