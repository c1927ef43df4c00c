//! Route table and the authorization guard consulted on every navigation.
//!
//! The guard is advisory: it decides what the dashboard shell renders, nothing
//! more. Anything that must stay private has to be enforced by the service that
//! owns the data.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::identity::Role;

pub const NOT_FOUND_PATH: &str = "/not-found";

/// Views the shell knows how to render. Rendering itself lives in the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Landing,
    Login,
    Signup,
    Dashboard,
    Users,
    Settings,
    Maps,
    BusinessForm,
    StartingForm,
    NotFound,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Landing => "Business Permits & Zoning",
            View::Login => "Sign in",
            View::Signup => "Create an account",
            View::Dashboard => "Dashboard",
            View::Users => "Users",
            View::Settings => "Settings",
            View::Maps => "Zoning Maps",
            View::BusinessForm => "Business Registration",
            View::StartingForm => "Start a Business",
            View::NotFound => "Page not found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Roles(&'static [Role]),
}

impl Access {
    pub fn permits(&self, role: Option<Role>) -> bool {
        match self {
            Access::Public => true,
            Access::Roles(set) => role.map(|r| set.contains(&r)).unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub view: View,
    pub access: Access,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    Redirect(&'static str),
}

const LGU: &[Role] = &[Role::Lgu];
const OWNER: &[Role] = &[Role::BusinessOwner];
const ANY_ROLE: &[Role] = &[Role::Lgu, Role::BusinessOwner];

pub static ROUTES: &[RouteEntry] = &[
    RouteEntry { path: "/", view: View::Landing, access: Access::Public },
    RouteEntry { path: "/login", view: View::Login, access: Access::Public },
    RouteEntry { path: "/signup", view: View::Signup, access: Access::Public },
    RouteEntry { path: "/home", view: View::Dashboard, access: Access::Roles(LGU) },
    RouteEntry { path: "/users", view: View::Users, access: Access::Roles(LGU) },
    RouteEntry { path: "/maps", view: View::Maps, access: Access::Roles(LGU) },
    RouteEntry { path: "/settings", view: View::Settings, access: Access::Roles(ANY_ROLE) },
    RouteEntry { path: "/biznest/form", view: View::BusinessForm, access: Access::Roles(OWNER) },
    RouteEntry { path: "/startingform", view: View::StartingForm, access: Access::Roles(OWNER) },
    RouteEntry { path: NOT_FOUND_PATH, view: View::NotFound, access: Access::Public },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate route path '{0}'")]
    DuplicatePath(&'static str),
    #[error("duplicate nav id '{0}'")]
    DuplicateNavId(&'static str),
    #[error("not-found route '{0}' is missing or not public")]
    NotFoundRoute(&'static str),
}

/// An ordered, immutable set of routes.
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    entries: &'static [RouteEntry],
}

impl Default for RouteTable {
    fn default() -> Self { Self { entries: ROUTES } }
}

impl RouteTable {
    pub fn new(entries: &'static [RouteEntry]) -> Self { Self { entries } }

    pub fn entries(&self) -> &'static [RouteEntry] { self.entries }

    /// Exact path match; no prefixes, no wildcards.
    pub fn lookup(&self, path: &str) -> Option<&'static RouteEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();
        for e in self.entries {
            if !seen.insert(e.path) { return Err(TableError::DuplicatePath(e.path)); }
        }
        match self.lookup(NOT_FOUND_PATH) {
            Some(e) if e.access == Access::Public => Ok(()),
            _ => Err(TableError::NotFoundRoute(NOT_FOUND_PATH)),
        }
    }

    /// Decide whether `role` may render `path`.
    ///
    /// Unknown paths and unauthorized access redirect to the same place; only the
    /// debug log tells them apart.
    pub fn guard(&self, role: Option<Role>, path: &str) -> RouteDecision {
        let Some(entry) = self.lookup(path) else {
            debug!(target: "guard", path, "no such route");
            return RouteDecision::Redirect(NOT_FOUND_PATH);
        };
        if entry.access.permits(role) {
            RouteDecision::Render(entry.view)
        } else {
            debug!(target: "guard", path, role = ?role, "role not permitted");
            RouteDecision::Redirect(NOT_FOUND_PATH)
        }
    }
}

/// Guard against the built-in route table.
pub fn guard(role: Option<Role>, path: &str) -> RouteDecision { RouteTable::default().guard(role, path) }

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Option<Role>; 3] = [None, Some(Role::Lgu), Some(Role::BusinessOwner)];

    #[test]
    fn builtin_table_is_valid() {
        RouteTable::default().validate().unwrap();
    }

    #[test]
    fn public_routes_render_for_everyone() {
        for e in ROUTES.iter().filter(|e| e.access == Access::Public) {
            for r in ROLES {
                assert_eq!(guard(r, e.path), RouteDecision::Render(e.view), "{} for {:?}", e.path, r);
            }
        }
    }

    #[test]
    fn protected_routes_follow_their_allow_list() {
        for e in ROUTES {
            let Access::Roles(set) = e.access else { continue };
            for r in ROLES {
                let expect = match r {
                    Some(role) if set.contains(&role) => RouteDecision::Render(e.view),
                    _ => RouteDecision::Redirect(NOT_FOUND_PATH),
                };
                assert_eq!(guard(r, e.path), expect, "{} for {:?}", e.path, r);
            }
        }
    }

    #[test]
    fn unknown_paths_redirect() {
        for r in ROLES {
            for p in ["/nope", "*", "", "/home/", "/HOME", "/biznest", "/biznest/form/extra"] {
                assert_eq!(guard(r, p), RouteDecision::Redirect(NOT_FOUND_PATH));
            }
        }
    }

    #[test]
    fn validate_catches_duplicates_and_missing_not_found() {
        static DUP: &[RouteEntry] = &[
            RouteEntry { path: "/a", view: View::Landing, access: Access::Public },
            RouteEntry { path: "/a", view: View::Login, access: Access::Public },
        ];
        assert_eq!(RouteTable::new(DUP).validate(), Err(TableError::DuplicatePath("/a")));
        static GATED: &[RouteEntry] = &[
            RouteEntry { path: NOT_FOUND_PATH, view: View::NotFound, access: Access::Roles(LGU) },
        ];
        assert_eq!(RouteTable::new(GATED).validate(), Err(TableError::NotFoundRoute(NOT_FOUND_PATH)));
    }
}
