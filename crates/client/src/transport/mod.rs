//! HTTP transports for the file-storage backend.
//!
//! Everything here is thin glue over REST: [`Backend`] owns the shared
//! client, base URL, and bearer-token interception; [`FileTransport`] and
//! [`AuthTransport`] wrap the individual endpoints.

mod auth;
mod backend;
mod files;

pub use auth::AuthTransport;
pub use backend::{Backend, TransportError, TransportResult};
pub use files::FileTransport;
