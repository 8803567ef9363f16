//! Closed role set and the normalizer that maps raw role strings onto it.
//!
//! The backend is not consistent about casing or language ("Admin",
//! "ADMINISTRATEUR", "Employé"...). Every raw role goes through [`normalize`]
//! before it is stored anywhere, so a [`Role`] value is always canonical.

use core::convert::Infallible;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Permission level of a user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Least-privileged standard role; also the fallback for anything unknown.
    #[default]
    Employee,
    Manager,
    Accountant,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Employee, Role::Manager, Role::Accountant, Role::Admin];

    /// Canonical wire name (the backend's vocabulary).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employe",
            Role::Manager => "manager",
            Role::Accountant => "comptable",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup(clean: &str) -> Option<Role> {
    match clean {
        "employé" | "employe" | "employee" => Some(Role::Employee),
        "manager" => Some(Role::Manager),
        "comptable" | "accountant" => Some(Role::Accountant),
        "admin" | "administrator" | "administrateur" => Some(Role::Admin),
        _ => None,
    }
}

/// Map a raw role string onto the closed role set.
///
/// Total: absent, blank and unrecognized input all become [`Role::Employee`].
pub fn normalize(raw: Option<&str>) -> Role {
    let Some(raw) = raw else {
        tracing::debug!("missing role, defaulting to {}", Role::Employee);
        return Role::Employee;
    };

    let clean = raw.trim().to_lowercase();
    let role = lookup(&clean).unwrap_or_default();
    tracing::debug!(raw, role = %role, "role normalized");
    role
}

/// Like [`normalize`], for arbitrary JSON (non-strings become [`Role::Employee`]).
pub fn normalize_value(raw: &Value) -> Role {
    normalize(raw.as_str())
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(normalize(Some(s)))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_value(&raw))
    }
}
