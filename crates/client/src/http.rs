//! HTTP client adapter.
//!
//! Every outbound request reads the bearer token through a [`TokenProvider`]
//! (not from the session's in-memory state), and every 401 response is routed
//! to an [`UnauthorizedHandler`] before the error reaches the caller.

use std::sync::{Arc, OnceLock, Weak};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::navigation::{Navigator, redirect_unless_on};
use crate::routes::LOGIN_PATH;
use crate::session::SessionStore;
use crate::storage::{Storage, clear_session, keys};

/// Source of the bearer credential attached to outbound requests.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Reads `auth_token` from durable storage on every call.
pub struct StorageTokenProvider {
    storage: Arc<dyn Storage>,
}

impl StorageTokenProvider {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

impl TokenProvider for StorageTokenProvider {
    fn token(&self) -> Option<String> {
        self.storage
            .get(keys::AUTH_TOKEN)
            .filter(|t| !t.is_empty())
    }
}

/// Reaction to a 401 from any request.
pub trait UnauthorizedHandler: Send + Sync {
    fn unauthorized(&self);
}

/// Clears both session keys, drops the in-memory session and sends the host
/// to the login page. The API is not notified.
///
/// The session is attached after construction since it depends on the client
/// this handler is installed in.
pub struct SessionReset {
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    session: OnceLock<Weak<SessionStore>>,
}

impl SessionReset {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage,
            navigator,
            session: OnceLock::new(),
        }
    }

    /// Bind the session whose in-memory state is dropped on 401.
    pub fn attach(&self, session: &Arc<SessionStore>) {
        if self.session.set(Arc::downgrade(session)).is_err() {
            tracing::warn!("session reset already attached; ignoring");
        }
    }
}

impl UnauthorizedHandler for SessionReset {
    fn unauthorized(&self) {
        if let Err(err) = clear_session(self.storage.as_ref()) {
            tracing::warn!("failed to clear stored session after 401: {err}");
        }
        if let Some(session) = self.session.get().and_then(Weak::upgrade) {
            session.reset_local();
        }
        redirect_unless_on(self.navigator.as_ref(), LOGIN_PATH);
    }
}

/// JSON client for the remote API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenProvider>,
        on_unauthorized: Arc<dyn UnauthorizedHandler>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens,
            on_unauthorized,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.config.endpoint(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(token) = self.tokens.token() {
            req = req.bearer_auth(token);
        }

        req
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(Method::GET, path, self.request(Method::GET, path)).await?;
        decode(resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::POST, path).json(body);
        let resp = self.send(Method::POST, path, req).await?;
        decode(resp).await
    }

    /// POST without a body; the response content is not consumed.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::POST, path, self.request(Method::POST, path))
            .await
            .map(|_| ())
    }

    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, "request failed: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(resp);
        }

        let message = error_message(resp).await;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "401 received; resetting stored session");
            self.on_unauthorized.unauthorized();
            return Err(ApiError::Unauthorized { message });
        }

        tracing::warn!(%method, path, status = status.as_u16(), ?message, "API error");
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// `message` field of a JSON error body, if any.
async fn error_message(resp: Response) -> Option<String> {
    resp.json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
