//! Application wiring shared by the binary and embedding hosts.

use std::sync::Arc;

use notesdesk_core::DomainError;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::error::StorageError;
use crate::guard::RouteGuard;
use crate::http::{ApiClient, SessionReset, StorageTokenProvider};
use crate::navigation::Navigator;
use crate::router::Router;
use crate::routes::RouteTable;
use crate::session::SessionStore;
use crate::storage::{FileStorage, Storage};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Routes(#[from] DomainError),
}

/// Everything a host needs, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub storage: Arc<dyn Storage>,
    pub navigator: Arc<dyn Navigator>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub router: Arc<Router>,
}

impl AppState {
    /// Wire the standard stack with file-backed storage.
    pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.storage_path)?);
        Self::with_storage(config, storage, navigator)
    }

    /// Wire the standard stack over an arbitrary storage backend.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let reset = Arc::new(SessionReset::new(storage.clone(), navigator.clone()));
        let api = Arc::new(ApiClient::new(
            config.clone(),
            Arc::new(StorageTokenProvider::new(storage.clone())),
            reset.clone(),
        ));
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone(), navigator.clone()));
        reset.attach(&session);
        let guard = RouteGuard::new(session.clone(), storage.clone());
        let router = Arc::new(Router::new(RouteTable::standard()?, guard));

        tracing::info!(api_url = %config.api_url, "client initialized");

        Ok(Self {
            config,
            storage,
            navigator,
            api,
            session,
            router,
        })
    }
}
