//! Auth and user endpoint transport.
//!
//! Wraps login, registration, and the administrative user endpoints. The
//! transports stay pure: login returns the issued token and the caller
//! decides where to persist it.

use std::sync::Arc;

use api::models::{AssignRequest, LoginData, RegisterRequest, UserInfo};
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

use super::backend::{Backend, TransportResult};

/// Transport for `/login` and the `/user/*` endpoints.
#[derive(Debug, Clone)]
pub struct AuthTransport {
    backend: Arc<Backend>,
}

impl AuthTransport {
    /// Creates an auth transport over the shared backend.
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    /// Logs in with email and password.
    ///
    /// Credentials go as multipart form fields, matching what the backend's
    /// login filter consumes. Returns the issued token payload.
    pub async fn login(&self, email: &str, password: &str) -> TransportResult<LoginData> {
        let form = Form::new()
            .text("email", email.to_string())
            .text("password", password.to_string());

        let response = self
            .backend
            .request(Method::POST, "login")?
            .multipart(form)
            .send()
            .await?;
        let response = Backend::check(response, "login")?;

        let data: LoginData = response.json().await?;
        info!(email, "login succeeded");
        Ok(data)
    }

    /// Registers a new account.
    pub async fn register(&self, email: &str, password: &str) -> TransportResult<()> {
        let payload = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .backend
            .request(Method::POST, "user/register")?
            .json(&payload)
            .send()
            .await?;
        Backend::check(response, "user/register")?;

        info!(email, "account registered");
        Ok(())
    }

    /// Fetches the account record for an email.
    pub async fn user_info(&self, email: &str) -> TransportResult<UserInfo> {
        let response = self
            .backend
            .request(Method::GET, "user/info")?
            .query(&[("email", email)])
            .send()
            .await?;
        let response = Backend::check(response, "user/info")?;

        Ok(response.json().await?)
    }

    /// Lists every account (administrative).
    pub async fn all_users(&self) -> TransportResult<Vec<UserInfo>> {
        let response = self
            .backend
            .request(Method::GET, "user/all")?
            .send()
            .await?;
        let response = Backend::check(response, "user/all")?;

        Ok(response.json().await?)
    }

    /// Deletes an account by id (administrative). Returns the removed
    /// record.
    pub async fn delete_user(&self, user_id: i64) -> TransportResult<UserInfo> {
        let response = self
            .backend
            .request(Method::DELETE, "user/delete")?
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let response = Backend::check(response, "user/delete")?;

        let removed: UserInfo = response.json().await?;
        info!(user_id, email = %removed.email, "user deleted");
        Ok(removed)
    }

    /// Assigns storage credits to an account (administrative).
    pub async fn assign(&self, user_id: i64, request: &AssignRequest) -> TransportResult<()> {
        let response = self
            .backend
            .request(Method::POST, "user/assign")?
            .query(&[("userId", user_id)])
            .json(request)
            .send()
            .await?;
        Backend::check(response, "user/assign")?;

        info!(user_id, amount = request.amount, "credits assigned");
        Ok(())
    }
}
