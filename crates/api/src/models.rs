//! Data model for the file-storage REST backend.
//!
//! All types mirror the backend's JSON exactly (camelCase field names,
//! UPPERCASE kind discriminants). They carry no client-side invariants
//! beyond matching that schema: a [`FileInfo`] is immutable once received,
//! and the displayed list is reconciled by replacing, appending, or removing
//! whole records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a stored file, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileKind {
    /// Generic file.
    File,
    /// Image content.
    Image,
    /// Video content.
    Video,
    /// Archive (zip, tar, ...).
    Archive,
}

impl FileKind {
    /// Returns the display glyph name for this kind.
    pub fn icon(&self) -> &'static str {
        match self {
            FileKind::File => "insert_drive_file",
            FileKind::Image => "image",
            FileKind::Video => "play_circle",
            FileKind::Archive => "archive",
        }
    }
}

/// A stored file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Backend-assigned identifier.
    pub id: i64,
    /// Display name of the file.
    pub name: String,
    /// Type classification.
    pub file_type: FileKind,
    /// Size in bytes.
    pub size: u64,
    /// When the file was stored.
    pub created_at: DateTime<Utc>,
}

/// Page envelope returned by the file listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoPage {
    /// The records on this page.
    pub content: Vec<FileInfo>,
    /// Total records across all pages.
    pub total_elements: u64,
    /// Total number of pages.
    pub total_pages: u32,
    /// Zero-based index of this page.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
}

/// A user account, used for display and administrative actions only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Backend-assigned identifier.
    pub id: i64,
    /// Account email address.
    pub email: String,
    /// Role name (e.g. `USER`, `ADMIN`).
    pub role: String,
    /// Remaining storage credits.
    pub credits: i64,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    /// The issued bearer token.
    pub token: String,
}

/// Registration request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Email for the new account.
    pub email: String,
    /// Password for the new account.
    pub password: String,
}

/// Credit-assignment request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignRequest {
    /// Credit amount to assign.
    pub amount: i64,
    /// Free-form reason shown in the account history.
    pub description: String,
}
