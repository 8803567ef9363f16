//! Login wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the user typed into the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn to_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            mot_de_passe: &self.password,
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub mot_de_passe: &'a str,
}

/// Body returned by `POST /api/login`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl LoginResponse {
    /// The credential to store, with any `"Bearer "` prefix removed.
    ///
    /// Blank tokens count as missing.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(strip_bearer)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Remove a single leading `"Bearer "` marker, if present.
pub fn strip_bearer(token: &str) -> &str {
    token.strip_prefix("Bearer ").unwrap_or(token)
}
