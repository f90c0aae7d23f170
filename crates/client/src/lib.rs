//! # Cirrus Client Library
//!
//! This crate provides the client application for the Cirrus personal
//! file-storage service: transports over the REST backend, the upload
//! orchestration flow, the dashboard state, and the terminal UI.
//!
//! ## Overview
//!
//! The client is thin glue over the backend. It provides:
//!
//! - **Transports**: file and auth/user endpoint wrappers over a shared
//!   HTTP backend that attaches the bearer token to every request
//! - **Session Storage**: the token persisted under a fixed key
//! - **Upload Flow**: batch validation, confirmation, background upload
//!   with progress, and a broadcast stream of completed records
//! - **Dashboard**: displayed-list reconciliation and the ratatui UI
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Terminal UI / CLI                     │
//! ├────────────────────────────────────────────────────────────┤
//! │                                                            │
//! │  ┌─────────────┐  ┌───────────────┐  ┌─────────────────┐  │
//! │  │  Dashboard  │  │    Upload     │  │     Upload      │  │
//! │  │ Controller  │◀─│  Broadcaster  │◀─│  Orchestrator   │  │
//! │  └─────────────┘  └───────────────┘  └─────────────────┘  │
//! │                                                            │
//! │  ┌──────────────────────────┐  ┌────────────────────────┐ │
//! │  │ File / Auth Transports   │  │      Token Store       │ │
//! │  └──────────────────────────┘  └────────────────────────┘ │
//! │  ┌──────────────────────────────────────────────────────┐ │
//! │  │        HTTP Backend (bearer interception)            │ │
//! │  └──────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use client::config::Config;
//! use client::storage::TokenStore;
//! use client::transport::{Backend, FileTransport};
//! use url::Url;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load_default()?;
//! let store = Arc::new(TokenStore::new(config.session_path()));
//! store.load()?;
//!
//! let base = Url::parse(&config.server.base_url)?;
//! let backend = Arc::new(Backend::new(base, store));
//! let files = FileTransport::new(backend, config.transfer.download_dir.clone());
//!
//! let page = files.list("id", 0, 50, false).await?;
//! println!("{} files stored", page.total_elements);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`storage`]: Persistent session (bearer token) storage
//! - [`transport`]: HTTP transports and the request interceptor
//! - [`uploads`]: Upload batch, orchestration, and completion broadcast
//! - [`dashboard`]: Displayed-list reconciliation
//! - [`ui`]: Terminal dashboard

pub mod config;
pub mod dashboard;
pub mod storage;
pub mod transport;
pub mod ui;
pub mod uploads;

// Re-export the contract crate for convenience
pub use api;

// Re-export config types for convenience
pub use config::Config;

// Re-export dashboard types for convenience
pub use dashboard::DashboardController;

// Re-export storage types for convenience
pub use storage::TokenStore;

// Re-export transport types for convenience
pub use transport::{AuthTransport, Backend, FileTransport, TransportError, TransportResult};

// Re-export upload types for convenience
pub use uploads::{
    BatchError, UploadBatch, UploadBroadcaster, UploadEvent, UploadOrchestrator, UploadPhase,
    MAX_BATCH_FILES,
};

// Re-export UI types for convenience
pub use ui::{DashboardApp, ListingParams, Tab, View};
