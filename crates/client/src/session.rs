//! Session store: who is signed in, with which token and role.
//!
//! The store is constructed once and shared (behind `Arc`) with the route
//! guard. `is_authenticated` is always derived from `token` and `user`; it is
//! never stored on its own. Token and profile are mirrored into durable
//! storage so the session survives a restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use thiserror::Error;

use notesdesk_auth::{Credentials, Role, UserProfile};

use crate::api::AuthApi;
use crate::error::{ApiError, StorageError};
use crate::navigation::{Navigator, redirect_unless_on};
use crate::routes::{LANDING_PATH, LOGIN_PATH};
use crate::storage::{Storage, clear_session, keys};

/// Message shown when a login fails without a server-provided reason.
pub const DEFAULT_LOGIN_ERROR: &str = "Erreur de connexion.";

/// Coarse session state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Initializing,
    Authenticated,
}

/// What [`SessionStore::initialize`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A user was already resolved; nothing to do.
    AlreadyResolved,
    /// No stored token; the session stays signed out.
    NoToken,
    /// The cached profile was adopted without a network call.
    Restored,
    /// The profile was fetched from the API and cached.
    Fetched,
    /// The profile could not be resolved; the session was logged out.
    Failed,
}

/// Result of a login attempt. Logins never surface errors any other way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

#[derive(Debug, Error)]
enum LoginError {
    #[error("no token received from server")]
    MissingToken,

    #[error("server returned no usable user profile")]
    InvalidProfile,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoginError {
    fn user_message(&self) -> String {
        match self {
            LoginError::Api(err) => err.server_message().unwrap_or(DEFAULT_LOGIN_ERROR).to_string(),
            _ => DEFAULT_LOGIN_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
}

/// Shared session service.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<SessionState>,
    /// Serializes `initialize`; callers queued behind an in-flight fetch
    /// re-check the user and return without fetching again.
    init_lock: tokio::sync::Mutex<()>,
    initializing: AtomicBool,
}

impl SessionStore {
    /// Build the store; the in-memory token is seeded from storage.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        let token = storage.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty());
        Self {
            api,
            storage,
            navigator,
            state: RwLock::new(SessionState { token, user: None }),
            init_lock: tokio::sync::Mutex::new(()),
            initializing: AtomicBool::new(false),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.state.read();
        state.token.is_some() && state.user.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        if self.initializing.load(Ordering::Acquire) {
            SessionStatus::Initializing
        } else if self.is_authenticated() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    /// Whether the current user's role is one of `allowed`.
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        let Some(role) = self.role() else {
            tracing::debug!("has_role: no user");
            return false;
        };
        let granted = allowed.contains(&role);
        tracing::debug!(role = %role, ?allowed, granted, "role check");
        granted
    }

    /// Resolve the user behind a stored token.
    ///
    /// Never fails: unresolvable sessions are logged out instead.
    pub async fn initialize(&self) -> InitOutcome {
        if self.state.read().user.is_some() {
            return InitOutcome::AlreadyResolved;
        }

        let _guard = self.init_lock.lock().await;
        if self.state.read().user.is_some() {
            return InitOutcome::AlreadyResolved;
        }

        let _flag = InitializingFlag::raise(&self.initializing);
        let outcome = self.initialize_locked().await;
        tracing::debug!(?outcome, "session initialized");
        outcome
    }

    async fn initialize_locked(&self) -> InitOutcome {
        let Some(token) = self.storage.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty()) else {
            tracing::debug!("no stored token; staying signed out");
            return InitOutcome::NoToken;
        };
        self.state.write().token = Some(token);

        if let Some(raw) = self.storage.get(keys::USER_DATA) {
            match UserProfile::from_json(&raw) {
                Some(profile) => {
                    tracing::debug!(user_id = %profile.id, role = %profile.role, "using cached profile");
                    self.state.write().user = Some(profile);
                    return InitOutcome::Restored;
                }
                None => tracing::warn!("cached user data is unusable; fetching a fresh profile"),
            }
        }

        let profile = match self.api.current_user().await {
            Ok(value) => UserProfile::from_value(value),
            Err(err) => {
                tracing::warn!("failed to fetch user profile: {err}");
                None
            }
        };

        let Some(profile) = profile else {
            tracing::warn!("could not resolve user profile; logging out");
            self.logout().await;
            return InitOutcome::Failed;
        };

        if let Err(err) = self.persist_user(&profile) {
            tracing::warn!("failed to cache user profile: {err}");
        }
        self.state.write().user = Some(profile);
        InitOutcome::Fetched
    }

    /// Sign in and, on success, send the host to the landing page.
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        tracing::info!(email = %credentials.email, "login attempt");

        match self.try_login(credentials).await {
            Ok(()) => {
                tracing::info!(email = %credentials.email, "login succeeded");
                LoginOutcome::Success
            }
            Err(err) => {
                tracing::warn!(email = %credentials.email, "login failed: {err}");
                LoginOutcome::Failure {
                    message: err.user_message(),
                }
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<(), LoginError> {
        let response = self.api.login(credentials).await?;
        let token = response
            .bearer_token()
            .ok_or(LoginError::MissingToken)?
            .to_string();

        self.storage.set(keys::AUTH_TOKEN, &token)?;
        self.state.write().token = Some(token);

        let profile = match response.user.and_then(UserProfile::from_value) {
            Some(profile) => profile,
            None => {
                tracing::debug!("login response carried no usable user; fetching profile");
                let value = self.api.current_user().await?;
                UserProfile::from_value(value).ok_or(LoginError::InvalidProfile)?
            }
        };

        self.persist_user(&profile)?;
        self.state.write().user = Some(profile);
        self.navigator.redirect(LANDING_PATH);
        Ok(())
    }

    /// Sign out locally, notifying the API on a best-effort basis.
    ///
    /// Local cleanup runs even if the notification fails or this future is
    /// dropped mid-flight.
    pub async fn logout(&self) {
        let _cleanup = LogoutCleanup(self);

        if self.state.read().token.is_some() {
            if let Err(err) = self.api.logout().await {
                tracing::warn!("logout notification failed: {err}");
            }
        }
    }

    /// Forget the token and user held in memory. Storage and navigation are
    /// left to the caller.
    pub fn reset_local(&self) {
        let mut state = self.state.write();
        state.token = None;
        state.user = None;
    }

    fn clear_local(&self) {
        self.reset_local();
        if let Err(err) = clear_session(self.storage.as_ref()) {
            tracing::warn!("failed to clear stored session: {err}");
        }
        redirect_unless_on(self.navigator.as_ref(), LOGIN_PATH);
        tracing::info!("session cleared");
    }

    fn persist_user(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(profile)?;
        self.storage.set(keys::USER_DATA, &raw)
    }
}

struct LogoutCleanup<'a>(&'a SessionStore);

impl Drop for LogoutCleanup<'_> {
    fn drop(&mut self) {
        self.0.clear_local();
    }
}

struct InitializingFlag<'a>(&'a AtomicBool);

impl<'a> InitializingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InitializingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
