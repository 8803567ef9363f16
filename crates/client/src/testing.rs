//! Test doubles shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use notesdesk_auth::{Credentials, LoginResponse, UserProfile};

use crate::api::AuthApi;
use crate::error::ApiError;
use crate::guard::RouteGuard;
use crate::navigation::HistoryNavigator;
use crate::session::SessionStore;
use crate::storage::{MemoryStorage, Storage, keys};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Status(u16, Option<String>),
    Network,
}

impl Reply {
    fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Reply::Json(v) => Ok(v),
            Reply::Status(401, message) => Err(ApiError::Unauthorized { message }),
            Reply::Status(status, message) => Err(ApiError::Api { status, message }),
            Reply::Network => Err(ApiError::Network("connection refused".to_string())),
        }
    }
}

/// Scripted [`AuthApi`] that counts calls.
pub(crate) struct FakeApi {
    login_reply: Mutex<Reply>,
    user_reply: Mutex<Reply>,
    logout_reply: Mutex<Reply>,
    user_delay: Mutex<Option<Duration>>,
    login_calls: AtomicUsize,
    user_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    last_credentials: Mutex<Option<Credentials>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            login_reply: Mutex::new(Reply::Network),
            user_reply: Mutex::new(Reply::Network),
            logout_reply: Mutex::new(Reply::Json(Value::Null)),
            user_delay: Mutex::new(None),
            login_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }

    pub(crate) fn set_login(&self, reply: Value) {
        *self.login_reply.lock() = Reply::Json(reply);
    }

    pub(crate) fn fail_login(&self, reply: Reply) {
        *self.login_reply.lock() = reply;
    }

    pub(crate) fn set_user(&self, reply: Value) {
        *self.user_reply.lock() = Reply::Json(reply);
    }

    pub(crate) fn fail_user_with_status(&self, status: u16) {
        *self.user_reply.lock() = Reply::Status(status, None);
    }

    pub(crate) fn fail_logout(&self) {
        *self.logout_reply.lock() = Reply::Network;
    }

    pub(crate) fn delay_user(&self, delay: Duration) {
        *self.user_delay.lock() = Some(delay);
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_credentials(&self) -> Option<Credentials> {
        self.last_credentials.lock().clone()
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_credentials.lock() = Some(credentials.clone());
        let reply = self.login_reply.lock().clone();
        let value = reply.into_result()?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn current_user(&self) -> Result<Value, ApiError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.user_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.user_reply.lock().clone();
        reply.into_result()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.logout_reply.lock().clone();
        reply.into_result().map(|_| ())
    }
}

pub(crate) fn profile(id: u64, role: &str) -> UserProfile {
    UserProfile::from_value(serde_json::json!({ "id": id, "role": role, "email": "user@example.com" }))
        .expect("valid test profile")
}

/// Session wired to in-memory doubles.
pub(crate) struct Fixture {
    pub(crate) api: Arc<FakeApi>,
    pub(crate) storage: Arc<MemoryStorage>,
    pub(crate) navigator: Arc<HistoryNavigator>,
    pub(crate) session: Arc<SessionStore>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    /// Storage already holds a token and a cached profile.
    pub(crate) fn signed_in(profile: UserProfile) -> Self {
        let storage = MemoryStorage::new();
        storage.set(keys::AUTH_TOKEN, "token-1").unwrap();
        storage
            .set(keys::USER_DATA, &serde_json::to_string(&profile).unwrap())
            .unwrap();
        Self::with_storage(storage)
    }

    fn with_storage(storage: MemoryStorage) -> Self {
        let api = Arc::new(FakeApi::new());
        let storage = Arc::new(storage);
        let navigator = Arc::new(HistoryNavigator::new("/"));
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone(), navigator.clone()));
        Self {
            api,
            storage,
            navigator,
            session,
        }
    }

    pub(crate) fn store_token(&self, token: &str) {
        self.storage.set(keys::AUTH_TOKEN, token).unwrap();
    }

    pub(crate) fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone(), self.storage.clone())
    }
}
