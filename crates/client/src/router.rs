//! Path-based navigation: resolve, guard, follow redirects.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::guard::{GuardDecision, RouteGuard};
use crate::routes::{RouteTable, RouteTarget, ViewId};

/// Upper bound on redirects followed for a single navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("no route matches '{0}'")]
    NoMatch(String),

    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
}

/// Where a navigation landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub view: ViewId,
    pub params: BTreeMap<String, String>,
}

pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
    current: Mutex<Option<Navigation>>,
}

impl Router {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self {
            table,
            guard,
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<Navigation> {
        self.current.lock().clone()
    }

    /// Navigate to `path`, following static and guard redirects.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, RouterError> {
        let mut target = path.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let resolved = self
                .table
                .resolve(&target)
                .ok_or_else(|| RouterError::NoMatch(target.clone()))?;

            let view = match &resolved.descriptor.target {
                RouteTarget::Redirect(to) => {
                    tracing::debug!(from = %resolved.path, to = %to, "static redirect");
                    target = to.clone();
                    continue;
                }
                RouteTarget::View(view) => *view,
            };

            let from_path = self.current.lock().as_ref().map(|nav| nav.path.clone());
            let from = from_path
                .as_deref()
                .and_then(|p| self.table.resolve(p))
                .map(|r| r.descriptor);

            match self.guard.before_each(resolved.descriptor, from).await {
                GuardDecision::Proceed => {
                    let navigation = Navigation {
                        path: resolved.path,
                        view,
                        params: resolved.params,
                    };
                    tracing::debug!(path = %navigation.path, view = ?navigation.view, "navigation complete");
                    *self.current.lock() = Some(navigation.clone());
                    return Ok(navigation);
                }
                GuardDecision::Redirect(to) => {
                    tracing::debug!(from = %resolved.path, to, "guard redirect");
                    target = to.to_string();
                }
            }
        }

        tracing::error!(path, "router error: redirect loop");
        Err(RouterError::RedirectLoop(path.to_string()))
    }
}
