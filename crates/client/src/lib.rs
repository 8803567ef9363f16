//! `notesdesk-client`
//!
//! **Responsibility:** authenticated, role-gated access to the notes and
//! displacements application.
//!
//! This crate provides:
//! - A session store (login/logout/initialize, role checks) mirrored into
//!   durable storage
//! - An HTTP adapter that injects the bearer token and resets the session on 401
//! - A declarative route table with a navigation guard and router
//!
//! Views are out of scope; hosts render whatever [`routes::ViewId`] the router
//! lands on.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod router;
pub mod routes;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use api::AuthApi;
pub use app::{AppError, AppState};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, StorageError};
pub use guard::{GuardDecision, RouteGuard};
pub use http::{ApiClient, SessionReset, StorageTokenProvider, TokenProvider, UnauthorizedHandler};
pub use navigation::{HistoryNavigator, Navigator};
pub use router::{Navigation, Router, RouterError};
pub use routes::{RouteDescriptor, RouteTable, ViewId};
pub use session::{InitOutcome, LoginOutcome, SessionStatus, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
