//! Shared HTTP backend with bearer-token interception.
//!
//! Every outbound request goes through [`Backend::request`], which attaches
//! `Authorization: Bearer <token>` when the session store holds a token and
//! omits the header otherwise. Response checking maps 401/403 to
//! [`TransportError::AuthRequired`] so callers can route the user back to
//! the login screen.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::storage::TokenStore;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend rejected the request with 401/403; a fresh login is
    /// needed.
    #[error("authentication required")]
    AuthRequired,

    /// The backend answered with an unexpected status code.
    #[error("unexpected status {status} from {path}")]
    UnexpectedStatus {
        /// The status the backend returned.
        status: StatusCode,
        /// The request path that produced it.
        path: String,
    },

    /// A request path could not be resolved against the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A download response carried no usable Content-Disposition file name.
    #[error("download response is missing a usable file name")]
    MissingFileName,

    /// Local filesystem failure while reading or writing transfer data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Shared HTTP backend for all transports.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Shared reqwest client.
    http: Client,
    /// Base URL, normalized to end with a slash.
    base: Url,
    /// Session store the bearer token is read from.
    store: Arc<TokenStore>,
}

impl Backend {
    /// Creates a backend for the given base URL and session store.
    pub fn new(mut base: Url, store: Arc<TokenStore>) -> Self {
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            http: Client::new(),
            base,
            store,
        }
    }

    /// Builds a request for `path` relative to the base URL.
    ///
    /// The bearer token is attached when the session store holds one and
    /// left off otherwise; the backend decides what unauthenticated
    /// requests may do.
    pub fn request(&self, method: Method, path: &str) -> TransportResult<RequestBuilder> {
        let url = self.base.join(path)?;
        let mut builder = self.http.request(method, url);

        if let Some(token) = self.store.token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        Ok(builder)
    }

    /// Checks a response status, mapping auth failures and other
    /// non-success codes to typed errors.
    pub fn check(response: Response, path: &str) -> TransportResult<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(%status, path, "backend rejected credentials");
            return Err(TransportError::AuthRequired);
        }
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status,
                path: path.to_string(),
            });
        }

        Ok(response)
    }

    /// Returns the session store backing this backend.
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_with_store(temp_dir: &TempDir) -> Backend {
        let store = Arc::new(TokenStore::new(temp_dir.path().join("session.json")));
        let base = Url::parse("http://localhost:8080").unwrap();
        Backend::new(base, store)
    }

    #[test]
    fn bearer_header_attached_when_token_stored() {
        let temp_dir = TempDir::new().unwrap();
        let backend = backend_with_store(&temp_dir);
        backend.store().set_token("h.p.s".to_string()).unwrap();

        let request = backend
            .request(Method::GET, "file/all")
            .unwrap()
            .build()
            .unwrap();

        let auth = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer h.p.s");
    }

    #[test]
    fn bearer_header_omitted_without_token() {
        let temp_dir = TempDir::new().unwrap();
        let backend = backend_with_store(&temp_dir);

        let request = backend
            .request(Method::POST, "login")
            .unwrap()
            .build()
            .unwrap();

        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn paths_resolve_under_the_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(TokenStore::new(temp_dir.path().join("session.json")));
        let base = Url::parse("https://drive.example.com/api").unwrap();
        let backend = Backend::new(base, store);

        let request = backend
            .request(Method::DELETE, "file/delete/one")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://drive.example.com/api/file/delete/one"
        );
    }

    #[test]
    fn token_picked_up_after_later_login() {
        let temp_dir = TempDir::new().unwrap();
        let backend = backend_with_store(&temp_dir);

        let before = backend
            .request(Method::GET, "file/all")
            .unwrap()
            .build()
            .unwrap();
        assert!(before.headers().get(AUTHORIZATION).is_none());

        backend.store().set_token("h.p.s".to_string()).unwrap();

        let after = backend
            .request(Method::GET, "file/all")
            .unwrap()
            .build()
            .unwrap();
        assert!(after.headers().get(AUTHORIZATION).is_some());
    }
}
