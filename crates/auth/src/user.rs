//! Profile of the signed-in user as returned by the remote API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use notesdesk_core::UserId;

use crate::Role;

/// Resolved identity of the current user.
///
/// # Invariants
/// - `id` is present (non-zero / non-blank).
/// - `role` is canonical; raw role strings are normalized on the way in.
///
/// Any other profile fields the server sends are kept in `attributes` so the
/// cached copy round-trips the server object unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl UserProfile {
    /// Adopt a raw server payload, or `None` if it does not identify anybody.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value::<UserProfile>(value)
            .ok()
            .filter(|profile| profile.id.is_present())
    }

    /// Parse the serialized cache entry; malformed JSON counts as absent.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        Self::from_value(value)
    }

    pub fn email(&self) -> Option<&str> {
        self.attributes.get("email").and_then(Value::as_str)
    }

    /// Human-readable name built from whichever name fields the server sent.
    pub fn display_name(&self) -> Option<String> {
        let field = |key: &str| {
            self.attributes
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        match (field("prenom"), field("nom")) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => field("name").map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adopts_profile_and_normalizes_role() {
        let profile = UserProfile::from_value(json!({
            "id": 3,
            "role": "ADMINISTRATEUR",
            "email": "chef@example.com",
            "nom": "Martin",
            "prenom": "Claire",
        }))
        .unwrap();

        assert_eq!(profile.id, UserId::Numeric(3));
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.email(), Some("chef@example.com"));
        assert_eq!(profile.display_name().as_deref(), Some("Claire Martin"));
    }

    #[test]
    fn missing_role_defaults_to_employee() {
        let profile = UserProfile::from_value(json!({ "id": "u-1" })).unwrap();
        assert_eq!(profile.role, Role::Employee);
    }

    #[test]
    fn rejects_payloads_without_identity() {
        assert!(UserProfile::from_value(json!({ "role": "admin" })).is_none());
        assert!(UserProfile::from_value(json!({ "id": null, "role": "admin" })).is_none());
        assert!(UserProfile::from_value(json!({ "id": 0 })).is_none());
        assert!(UserProfile::from_value(json!({ "id": "" })).is_none());
        assert!(UserProfile::from_value(json!("admin")).is_none());
        assert!(UserProfile::from_value(Value::Null).is_none());
    }

    #[test]
    fn cache_round_trip_keeps_extra_fields() {
        let profile = UserProfile::from_value(json!({
            "id": 9,
            "role": "Accountant",
            "service": "finance",
        }))
        .unwrap();

        let raw = serde_json::to_string(&profile).unwrap();
        let cached: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(cached["role"], "comptable");
        assert_eq!(cached["service"], "finance");

        assert_eq!(UserProfile::from_json(&raw), Some(profile));
    }

    #[test]
    fn malformed_cache_is_absent() {
        assert!(UserProfile::from_json("{not json").is_none());
        assert!(UserProfile::from_json("").is_none());
    }
}
