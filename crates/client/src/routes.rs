//! Declarative route table.
//!
//! Each route carries its access policy: guest-only, authentication required,
//! and an optional set of roles allowed to see it. The table is built once at
//! startup and never mutated.

use std::collections::BTreeMap;

use notesdesk_auth::Role;
use notesdesk_core::{DomainError, DomainResult};

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Identity of the view a route renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ViewId {
    Login,
    Register,
    Dashboard,
    Notes,
    CreateNote,
    EditNote,
    Displacements,
    CreateDisplacement,
    Unauthorized,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll,
}

/// Path pattern: literal segments, `:param` segments and a trailing `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if !raw.starts_with('/') {
            return Err(DomainError::validation(format!(
                "route pattern '{raw}' must start with '/'"
            )));
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if i + 1 != parts.len() {
                    return Err(DomainError::validation(format!(
                        "catch-all must be the last segment in '{raw}'"
                    )));
                }
                Segment::CatchAll
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(DomainError::validation(format!(
                        "empty parameter name in '{raw}'"
                    )));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a normalized path, returning captured parameters.
    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = BTreeMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll => {
                    params.insert("pathMatch".to_string(), parts[i.min(parts.len())..].join("/"));
                    return Some(params);
                }
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// What a matched route does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewId),
    /// Static redirect, resolved before any guard runs.
    Redirect(String),
}

/// One entry of the route table.
///
/// `requires_guest` and `requires_auth` are never both set in the standard
/// table, though nothing enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub pattern: RoutePattern,
    pub name: Option<&'static str>,
    pub target: RouteTarget,
    pub requires_guest: bool,
    pub requires_auth: bool,
    pub allowed_roles: Option<Vec<Role>>,
}

impl RouteDescriptor {
    pub fn view(pattern: &str, name: &'static str, view: ViewId) -> DomainResult<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            name: Some(name),
            target: RouteTarget::View(view),
            requires_guest: false,
            requires_auth: false,
            allowed_roles: None,
        })
    }

    pub fn redirect(pattern: &str, to: &str) -> DomainResult<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            name: None,
            target: RouteTarget::Redirect(to.to_string()),
            requires_guest: false,
            requires_auth: false,
            allowed_roles: None,
        })
    }

    /// Only reachable while signed out.
    pub fn guest_only(mut self) -> Self {
        self.requires_guest = true;
        self
    }

    /// Requires a session whose role is in `roles`.
    pub fn authenticated(mut self, roles: &[Role]) -> Self {
        self.requires_auth = true;
        self.allowed_roles = Some(roles.to_vec());
        self
    }

    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn view_id(&self) -> Option<ViewId> {
        match self.target {
            RouteTarget::View(view) => Some(view),
            RouteTarget::Redirect(_) => None,
        }
    }
}

/// A path matched against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub descriptor: &'a RouteDescriptor,
    /// Normalized path (no query, fragment or trailing slash).
    pub path: String,
    pub params: BTreeMap<String, String>,
}

/// Ordered list of routes; first match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The application's routes.
    pub fn standard() -> DomainResult<Self> {
        use Role::{Accountant, Admin, Employee, Manager};

        Ok(Self::new(vec![
            RouteDescriptor::view(LOGIN_PATH, "Login", ViewId::Login)?.guest_only(),
            RouteDescriptor::view("/register", "Register", ViewId::Register)?.guest_only(),
            RouteDescriptor::redirect("/", LANDING_PATH)?,
            RouteDescriptor::view(LANDING_PATH, "Dashboard", ViewId::Dashboard)?
                .authenticated(&[Employee, Manager, Accountant, Admin]),
            RouteDescriptor::view("/notes", "Notes", ViewId::Notes)?
                .authenticated(&[Employee, Manager, Accountant, Admin]),
            RouteDescriptor::view("/notes/create", "CreateNote", ViewId::CreateNote)?
                .authenticated(&[Employee, Admin]),
            RouteDescriptor::view("/notes/edit/:id", "EditNote", ViewId::EditNote)?
                .authenticated(&[Employee, Admin]),
            // Accountants may read displacements elsewhere but not manage them here.
            RouteDescriptor::view("/deplacements", "Deplacements", ViewId::Displacements)?
                .authenticated(&[Employee, Manager, Admin]),
            RouteDescriptor::view("/deplacements/create", "CreateDeplacement", ViewId::CreateDisplacement)?
                .authenticated(&[Employee, Admin]),
            RouteDescriptor::view(UNAUTHORIZED_PATH, "Unauthorized", ViewId::Unauthorized)?,
            RouteDescriptor::view("/*", "NotFound", ViewId::NotFound)?,
        ]))
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let path = normalize_path(path);
        self.routes.iter().find_map(|descriptor| {
            descriptor.pattern.matches(&path).map(|params| ResolvedRoute {
                descriptor,
                path: path.clone(),
                params,
            })
        })
    }
}

/// Strip query/fragment, force a leading slash, drop a trailing slash.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}
