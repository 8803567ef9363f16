//! Navigation guard enforcing the route table's access policy.

use std::sync::Arc;

use crate::routes::{LANDING_PATH, LOGIN_PATH, RouteDescriptor, UNAUTHORIZED_PATH};
use crate::session::SessionStore;
use crate::storage::{Storage, keys};

/// Verdict for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Runs before every navigation.
pub struct RouteGuard {
    session: Arc<SessionStore>,
    storage: Arc<dyn Storage>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>, storage: Arc<dyn Storage>) -> Self {
        Self { session, storage }
    }

    /// Decide whether navigation to `to` may proceed.
    ///
    /// Order matters: guest-only pages first, then authentication, then roles,
    /// so that a role mismatch is never reported as a missing login.
    pub async fn before_each(&self, to: &RouteDescriptor, from: Option<&RouteDescriptor>) -> GuardDecision {
        tracing::debug!(
            from = ?from.map(RouteDescriptor::path),
            to = to.path(),
            "guard evaluating navigation"
        );

        if self.session.user().is_none() && self.storage.get(keys::AUTH_TOKEN).is_some() {
            let outcome = self.session.initialize().await;
            tracing::debug!(?outcome, "session initialized by guard");
        }

        let authenticated = self.session.is_authenticated();

        if to.requires_guest && authenticated {
            tracing::debug!(to = to.path(), "guest-only route while signed in");
            return GuardDecision::Redirect(LANDING_PATH);
        }

        if to.requires_auth && !authenticated {
            tracing::debug!(to = to.path(), "route requires a signed-in user");
            return GuardDecision::Redirect(LOGIN_PATH);
        }

        if let Some(allowed) = &to.allowed_roles {
            if authenticated && !self.session.has_role(allowed) {
                tracing::debug!(to = to.path(), role = ?self.session.role(), "role not allowed");
                return GuardDecision::Redirect(UNAUTHORIZED_PATH);
            }
        }

        GuardDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{RouteTable, ViewId};
    use crate::testing::{Fixture, profile};
    use notesdesk_auth::Role;
    use serde_json::json;

    fn route<'a>(table: &'a RouteTable, path: &str) -> &'a RouteDescriptor {
        table.resolve(path).unwrap().descriptor
    }

    #[tokio::test]
    async fn guest_route_while_signed_in_goes_to_dashboard() {
        let fx = Fixture::signed_in(profile(1, "employe"));
        let table = RouteTable::standard().unwrap();

        let decision = fx.guard().before_each(route(&table, "/login"), None).await;
        assert_eq!(decision, GuardDecision::Redirect("/dashboard"));
    }

    #[tokio::test]
    async fn protected_route_while_signed_out_goes_to_login() {
        let fx = Fixture::new();
        let table = RouteTable::standard().unwrap();

        let decision = fx.guard().before_each(route(&table, "/notes"), None).await;
        assert_eq!(decision, GuardDecision::Redirect("/login"));
        assert_eq!(fx.api.user_calls(), 0);
    }

    #[tokio::test]
    async fn role_mismatch_goes_to_unauthorized() {
        let fx = Fixture::signed_in(profile(2, "Manager"));
        let table = RouteTable::standard().unwrap();
        let to = RouteDescriptor::view("/notes/create", "CreateNote", ViewId::CreateNote)
            .unwrap()
            .authenticated(&["employe".parse::<Role>().unwrap(), "admin".parse::<Role>().unwrap()]);

        let decision = fx.guard().before_each(&to, Some(route(&table, "/dashboard"))).await;
        assert_eq!(decision, GuardDecision::Redirect("/unauthorized"));
    }

    #[tokio::test]
    async fn allowed_role_proceeds() {
        let fx = Fixture::signed_in(profile(3, "administrateur"));
        let table = RouteTable::standard().unwrap();

        let decision = fx.guard().before_each(route(&table, "/deplacements/create"), None).await;
        assert_eq!(decision, GuardDecision::Proceed);
    }

    #[tokio::test]
    async fn public_routes_always_proceed() {
        let fx = Fixture::new();
        let table = RouteTable::standard().unwrap();

        assert_eq!(fx.guard().before_each(route(&table, "/unauthorized"), None).await, GuardDecision::Proceed);
        assert_eq!(fx.guard().before_each(route(&table, "/missing"), None).await, GuardDecision::Proceed);
        assert_eq!(fx.guard().before_each(route(&table, "/login"), None).await, GuardDecision::Proceed);
    }

    #[tokio::test]
    async fn initializes_from_stored_token_before_deciding() {
        let fx = Fixture::new();
        fx.store_token("abc123");
        fx.api.set_user(json!({ "id": 5, "role": "comptable" }));
        let table = RouteTable::standard().unwrap();

        let decision = fx.guard().before_each(route(&table, "/notes"), None).await;
        assert_eq!(decision, GuardDecision::Proceed);
        assert_eq!(fx.api.user_calls(), 1);
        assert_eq!(fx.session.role(), Some(Role::Accountant));

        let decision = fx.guard().before_each(route(&table, "/deplacements"), None).await;
        assert_eq!(decision, GuardDecision::Redirect("/unauthorized"));
        assert_eq!(fx.api.user_calls(), 1);
    }

    #[tokio::test]
    async fn failed_initialization_is_treated_as_signed_out() {
        let fx = Fixture::new();
        fx.store_token("expired");
        fx.api.fail_user_with_status(500);
        let table = RouteTable::standard().unwrap();

        let decision = fx.guard().before_each(route(&table, "/dashboard"), None).await;
        assert_eq!(decision, GuardDecision::Redirect("/login"));
        assert!(fx.storage.get(keys::AUTH_TOKEN).is_none());
    }
}
