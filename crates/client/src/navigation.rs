//! Navigation commands issued by the session layer.
//!
//! In a browser host a redirect is a full page load that discards all
//! in-flight state. Keeping it behind [`Navigator`] lets the session and the
//! HTTP adapter issue redirects without touching any global environment.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Host navigation surface.
pub trait Navigator: Send + Sync {
    /// Path currently displayed.
    fn current_path(&self) -> String;

    /// Full-page navigation to `path`.
    fn redirect(&self, path: &str);
}

/// Redirect to `path` unless the host is already there.
pub fn redirect_unless_on(navigator: &dyn Navigator, path: &str) {
    if navigator.current_path() != path {
        navigator.redirect(path);
    }
}

/// A recorded redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: String,
    pub at: DateTime<Utc>,
}

/// In-memory navigator that records every redirect.
#[derive(Debug)]
pub struct HistoryNavigator {
    current: Mutex<String>,
    visits: Mutex<Vec<Visit>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            visits: Mutex::new(Vec::new()),
        }
    }

    /// Move without recording a redirect (e.g. the user typed a URL).
    pub fn set_current(&self, path: impl Into<String>) {
        *self.current.lock() = path.into();
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.visits.lock().clone()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.visits.lock().last().map(|v| v.path.clone())
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn redirect(&self, path: &str) {
        tracing::debug!(path, "redirect");
        *self.current.lock() = path.to_string();
        self.visits.lock().push(Visit {
            path: path.to_string(),
            at: Utc::now(),
        });
    }
}
