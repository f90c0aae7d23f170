//! # Cirrus API Contract Library
//!
//! This crate provides the wire contract shared by every Cirrus transport:
//! the serde data model for the file-storage REST backend and the helpers
//! for working with the bearer token the backend issues on login.
//!
//! ## Overview
//!
//! The api crate is the foundation of the client, providing:
//!
//! - **Data Model**: file records, page envelopes, and user/login payloads
//!   exactly as the backend serializes them (camelCase JSON)
//! - **Token Helpers**: unverified JWT payload decoding for display and
//!   expiry checks, plus the fixed key the token is stored under
//! - **Error Types**: typed failures for token parsing
//!
//! Signature verification is deliberately absent: the backend validates
//! tokens on every request, the client only ever decodes the payload to
//! show who is logged in.
//!
//! ## Example Usage
//!
//! ```rust
//! use api::models::{FileInfo, FileKind};
//! use api::token::TOKEN_KEY;
//!
//! let json = r#"{"id":7,"name":"notes.txt","fileType":"FILE","size":482,
//!               "createdAt":"2024-11-02T09:30:00Z"}"#;
//! let info: FileInfo = serde_json::from_str(json).unwrap();
//! assert_eq!(info.file_type, FileKind::File);
//! assert_eq!(TOKEN_KEY, "app-jwt");
//! ```
//!
//! ## Modules
//!
//! - [`models`]: REST data model
//! - [`token`]: bearer-token decoding and the storage key
//! - [`error`]: error types

pub mod error;
pub mod models;
pub mod token;

pub use error::{ApiError, Result};
pub use models::{
    AssignRequest, FileInfo, FileInfoPage, FileKind, LoginData, RegisterRequest, UserInfo,
};
pub use token::{decode_claims, Claims, TOKEN_KEY};
