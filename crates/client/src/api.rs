//! Authentication endpoints of the remote API.

use async_trait::async_trait;
use serde_json::Value;

use notesdesk_auth::{Credentials, LoginResponse};

use crate::error::ApiError;
use crate::http::ApiClient;

pub const LOGIN_ENDPOINT: &str = "/api/login";
pub const USER_ENDPOINT: &str = "/api/user";
pub const LOGOUT_ENDPOINT: &str = "/api/logout";

/// Remote calls the session store depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/login`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    /// `GET /api/user`; the raw profile, validated by the caller.
    async fn current_user(&self) -> Result<Value, ApiError>;

    /// `POST /api/logout`; best-effort.
    async fn logout(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json(LOGIN_ENDPOINT, &credentials.to_request()).await
    }

    async fn current_user(&self) -> Result<Value, ApiError> {
        self.get_json(USER_ENDPOINT).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty(LOGOUT_ENDPOINT).await
    }
}
