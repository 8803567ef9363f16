//! `notesdesk-auth`: pure identity model for the client session.
//!
//! This crate is intentionally decoupled from HTTP and storage: it only knows
//! how raw server payloads map onto typed identities and roles.

pub mod credentials;
pub mod roles;
pub mod user;

pub use credentials::{Credentials, LoginRequest, LoginResponse, strip_bearer};
pub use roles::{Role, normalize, normalize_value};
pub use user::UserProfile;
