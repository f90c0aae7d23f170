//! End-to-end integration tests for the Cirrus client.
//!
//! These tests verify complete flows work correctly:
//! - Configuration and session wiring
//! - Bearer-token interception
//! - Upload batch policy and flow teardown
//! - File-list reconciliation

use std::path::PathBuf;
use std::sync::Arc;

use api::models::{FileInfo, FileInfoPage, FileKind};
use client::config::Config;
use client::dashboard::DashboardController;
use client::storage::TokenStore;
use client::transport::{Backend, FileTransport};
use client::uploads::{
    BatchError, UploadBroadcaster, UploadEvent, UploadOrchestrator, UploadPhase, MAX_BATCH_FILES,
};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use tempfile::TempDir;
use url::Url;

/// Create a test configuration rooted in a temporary directory.
fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.client.data_dir = temp_dir.path().to_path_buf();
    config.transfer.download_dir = temp_dir.path().join("downloads");
    (config, temp_dir)
}

/// Wires a backend and file transport against a TEST-NET address; nothing
/// answers there, so anything that reaches the network hangs or fails.
fn create_test_transport(config: &Config) -> (Arc<TokenStore>, Arc<FileTransport>) {
    let store = Arc::new(TokenStore::new(config.session_path()));
    store.load().unwrap();

    let base = Url::parse("http://192.0.2.1:1/").unwrap();
    let backend = Arc::new(Backend::new(base, Arc::clone(&store)));
    let files = Arc::new(FileTransport::new(
        backend,
        config.transfer.download_dir.clone(),
    ));
    (store, files)
}

fn stored_record(id: i64, name: &str) -> FileInfo {
    FileInfo {
        id,
        name: name.to_string(),
        file_type: FileKind::File,
        size: 64,
        created_at: "2024-06-01T12:00:00Z".parse().unwrap(),
    }
}

// =============================================================================
// Configuration and Session Tests
// =============================================================================

#[test]
fn test_config_defaults_validate_and_locate_session() {
    let (config, temp_dir) = create_test_config();

    assert!(config.validate().is_ok());
    assert_eq!(config.session_path(), temp_dir.path().join("session.json"));
    assert_eq!(config.log_dir(), temp_dir.path().join("logs"));
}

#[test]
fn test_login_token_survives_restart() {
    let (config, _temp_dir) = create_test_config();

    // "Login": the transport returned a token, the caller persists it.
    let store = TokenStore::new(config.session_path());
    store.set_token("header.payload.sig".to_string()).unwrap();

    // "Restart": a fresh store over the same session file.
    let reopened = TokenStore::new(config.session_path());
    reopened.load().unwrap();

    assert!(reopened.is_authenticated());
    assert_eq!(reopened.token().as_deref(), Some("header.payload.sig"));
}

#[test]
fn test_logout_clears_the_persisted_session() {
    let (config, _temp_dir) = create_test_config();

    let store = TokenStore::new(config.session_path());
    store.set_token("tok".to_string()).unwrap();
    store.clear().unwrap();

    let reopened = TokenStore::new(config.session_path());
    reopened.load().unwrap();
    assert!(!reopened.is_authenticated());
}

// =============================================================================
// Bearer Interception Tests
// =============================================================================

#[test]
fn test_requests_carry_the_bearer_once_logged_in() {
    let (config, _temp_dir) = create_test_config();
    let store = Arc::new(TokenStore::new(config.session_path()));
    let base = Url::parse("http://192.0.2.1:1/").unwrap();
    let backend = Backend::new(base, Arc::clone(&store));

    let anonymous = backend
        .request(Method::GET, "file/all")
        .unwrap()
        .build()
        .unwrap();
    assert!(anonymous.headers().get(AUTHORIZATION).is_none());

    store.set_token("h.p.s".to_string()).unwrap();

    let authenticated = backend
        .request(Method::GET, "file/all")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        authenticated
            .headers()
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap(),
        "Bearer h.p.s"
    );
}

// =============================================================================
// Upload Flow Tests
// =============================================================================

#[tokio::test]
async fn test_oversized_batch_never_starts_a_flow() {
    let (config, _temp_dir) = create_test_config();
    let (_store, files) = create_test_transport(&config);
    let mut orchestrator = UploadOrchestrator::new(files, UploadBroadcaster::new());

    let too_many: Vec<PathBuf> = (0..=MAX_BATCH_FILES)
        .map(|i| PathBuf::from(format!("f{i}.txt")))
        .collect();
    let err = orchestrator.select(too_many, false).unwrap_err();

    assert!(matches!(err, BatchError::TooManyFiles { count: 7, .. }));
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
    assert!(!orchestrator.has_active_flow());
    assert!(orchestrator.confirm().is_none());
}

#[tokio::test]
async fn test_selecting_a_new_batch_ends_the_previous_progress_stream() {
    let (config, temp_dir) = create_test_config();
    let (_store, files) = create_test_transport(&config);
    let mut orchestrator = UploadOrchestrator::new(files, UploadBroadcaster::new());

    // A real local file makes the first flow reach the hanging network call.
    let path = temp_dir.path().join("first.txt");
    std::fs::write(&path, b"payload").unwrap();

    orchestrator.select(vec![path], false).unwrap();
    let mut first_rx = orchestrator.confirm().unwrap();
    assert!(matches!(
        first_rx.recv().await.unwrap(),
        UploadEvent::Started { total: 1 }
    ));

    // Selecting again tears the first flow down; its sender is dropped, so
    // the stream ends instead of delivering more progress.
    orchestrator
        .select(vec![PathBuf::from("second.txt")], false)
        .unwrap();
    assert_eq!(orchestrator.phase(), UploadPhase::Confirming);

    while first_rx.recv().await.is_some() {}
}

#[tokio::test]
async fn test_confirmed_batch_reports_progress_and_finishes() {
    let (config, temp_dir) = create_test_config();
    let (_store, files) = create_test_transport(&config);
    let mut orchestrator = UploadOrchestrator::new(files, UploadBroadcaster::new());

    // Missing local files fail before any request is attempted.
    let batch = vec![
        temp_dir.path().join("missing-a.txt"),
        temp_dir.path().join("missing-b.txt"),
    ];
    orchestrator.select(batch, false).unwrap();
    let mut rx = orchestrator.confirm().unwrap();

    assert!(matches!(
        rx.recv().await.unwrap(),
        UploadEvent::Started { total: 2 }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        UploadEvent::Failed { index: 0, .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        UploadEvent::Failed { index: 1, .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        UploadEvent::Finished {
            stored: 0,
            total: 2
        }
    ));

    orchestrator.finish();
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
}

#[tokio::test]
async fn test_declining_the_confirmation_uploads_nothing() {
    let (config, _temp_dir) = create_test_config();
    let (_store, files) = create_test_transport(&config);
    let mut orchestrator = UploadOrchestrator::new(files, UploadBroadcaster::new());

    orchestrator
        .select(vec![PathBuf::from("a.txt")], false)
        .unwrap();
    assert_eq!(orchestrator.phase(), UploadPhase::Confirming);

    orchestrator.dismiss();

    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
    assert!(!orchestrator.has_active_flow());
    assert!(orchestrator.confirm().is_none());
}

// =============================================================================
// File List Reconciliation Tests
// =============================================================================

#[tokio::test]
async fn test_completed_uploads_fan_out_into_the_displayed_list() {
    let broadcaster = UploadBroadcaster::new();
    let mut subscription = broadcaster.subscribe();
    let mut dashboard = DashboardController::new();

    broadcaster.publish(stored_record(1, "a.txt"));
    broadcaster.publish(stored_record(2, "b.txt"));

    while let Ok(info) = subscription.try_recv() {
        dashboard.apply_uploaded(info);
    }

    let ids: Vec<_> = dashboard.files().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_redelivered_completion_is_not_shown_twice() {
    let broadcaster = UploadBroadcaster::new();
    let mut subscription = broadcaster.subscribe();
    let mut dashboard = DashboardController::new();

    broadcaster.publish(stored_record(7, "dup.txt"));
    broadcaster.publish(stored_record(7, "dup.txt"));

    while let Ok(info) = subscription.try_recv() {
        dashboard.apply_uploaded(info);
    }

    assert_eq!(dashboard.files().len(), 1);
}

#[test]
fn test_refresh_replaces_and_delete_removes_exactly_one() {
    let mut dashboard = DashboardController::new();
    dashboard.replace_files(FileInfoPage {
        content: vec![stored_record(1, "a"), stored_record(2, "b")],
        total_elements: 2,
        total_pages: 1,
        number: 0,
        size: 50,
    });

    // A fresh fetch replaces the list wholesale.
    dashboard.replace_files(FileInfoPage {
        content: vec![
            stored_record(1, "a"),
            stored_record(2, "b"),
            stored_record(3, "c"),
        ],
        total_elements: 3,
        total_pages: 1,
        number: 0,
        size: 50,
    });
    assert_eq!(dashboard.files().len(), 3);

    // A confirmed delete removes the matching identifier and nothing else.
    assert!(dashboard.confirm_deleted(2));
    let ids: Vec<_> = dashboard.files().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 3]);
}
