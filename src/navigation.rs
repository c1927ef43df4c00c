//! Role-filtered navigation for the desktop sidebar and the mobile tab bar.
//!
//! Both surfaces derive from the single `NAV_ITEMS` table. An item names the roles
//! that may see it and the surfaces it appears on; the filter is the same for both.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::identity::Role;
use crate::routes::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Desktop,
    Mobile,
}

impl Surface {
    pub fn parse(s: &str) -> Option<Surface> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Some(Surface::Desktop),
            "mobile" => Some(Surface::Mobile),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Desktop => "desktop",
            Surface::Mobile => "mobile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavHref {
    Path(&'static str),
    /// Parent that only expands; it has no page of its own.
    Expandable,
}

impl NavHref {
    pub fn path(&self) -> Option<&'static str> {
        match self {
            NavHref::Path(p) => Some(p),
            NavHref::Expandable => None,
        }
    }

    fn is_prefix_of(&self, location: &str) -> bool {
        match self {
            NavHref::Path(p) => !p.contains('*') && location.starts_with(p),
            NavHref::Expandable => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavChild {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub href: NavHref,
    pub surfaces: &'static [Surface],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub href: NavHref,
    pub roles: &'static [Role],
    pub surfaces: &'static [Surface],
    pub children: &'static [NavChild],
}

const BOTH: &[Surface] = &[Surface::Desktop, Surface::Mobile];
const DESKTOP: &[Surface] = &[Surface::Desktop];

pub static NAV_ITEMS: &[NavItem] = &[
    NavItem { id: "dashboard", label: "Dashboard", icon: "layout-dashboard", href: NavHref::Path("/home"), roles: &[Role::Lgu], surfaces: BOTH, children: &[] },
    NavItem { id: "users", label: "Users", icon: "users", href: NavHref::Path("/users"), roles: &[Role::Lgu], surfaces: DESKTOP, children: &[] },
    NavItem { id: "biznest-form", label: "Business", icon: "briefcase", href: NavHref::Path("/biznest/form"), roles: &[Role::BusinessOwner], surfaces: BOTH, children: &[] },
    NavItem {
        id: "settings",
        label: "Settings",
        icon: "settings",
        href: NavHref::Expandable,
        roles: &[Role::Lgu, Role::BusinessOwner],
        surfaces: BOTH,
        children: &[
            NavChild { id: "settings-profile", label: "Profile", icon: "user", href: NavHref::Path("/settings"), surfaces: BOTH },
            NavChild { id: "settings-theme", label: "Theme", icon: "palette", href: NavHref::Path("/settings#theme"), surfaces: DESKTOP },
        ],
    },
    NavItem { id: "maps", label: "Maps", icon: "map", href: NavHref::Path("/maps"), roles: &[Role::Lgu], surfaces: BOTH, children: &[] },
    NavItem { id: "startingform", label: "Start a Business", icon: "file-plus", href: NavHref::Path("/startingform"), roles: &[Role::BusinessOwner], surfaces: DESKTOP, children: &[] },
];

/// A nav entry as it appears on one surface for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleNav {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub href: Option<&'static str>,
    pub children: Vec<VisibleChild>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleChild {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub href: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct NavTable {
    items: &'static [NavItem],
}

impl Default for NavTable {
    fn default() -> Self { Self { items: NAV_ITEMS } }
}

impl NavTable {
    pub fn new(items: &'static [NavItem]) -> Self { Self { items } }

    pub fn items(&self) -> &'static [NavItem] { self.items }

    /// Parents and children share one id namespace.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();
        for it in self.items {
            if !seen.insert(it.id) { return Err(TableError::DuplicateNavId(it.id)); }
            for c in it.children {
                if !seen.insert(c.id) { return Err(TableError::DuplicateNavId(c.id)); }
            }
        }
        Ok(())
    }

    /// Top-level ids permitted for `role` on `surface`, in declaration order.
    pub fn allowed_ids(&self, role: Role, surface: Surface) -> Vec<&'static str> {
        self.items.iter().filter(|it| it.roles.contains(&role) && it.surfaces.contains(&surface)).map(|it| it.id).collect()
    }

    pub fn filter(&self, role: Option<Role>, surface: Surface) -> Vec<VisibleNav> {
        let Some(role) = role else { return Vec::new(); };
        self.items
            .iter()
            .filter(|it| it.roles.contains(&role) && it.surfaces.contains(&surface))
            .map(|it| VisibleNav {
                id: it.id,
                label: it.label,
                icon: it.icon,
                href: it.href.path(),
                // children ride on the parent's visibility; only the surface selects them
                children: it
                    .children
                    .iter()
                    .filter(|c| c.surfaces.contains(&surface))
                    .map(|c| VisibleChild { id: c.id, label: c.label, icon: c.icon, href: c.href.path() })
                    .collect(),
            })
            .collect()
    }
}

pub fn filter(role: Option<Role>, surface: Surface) -> Vec<VisibleNav> { NavTable::default().filter(role, surface) }

/// Id of the entry to highlight for `location`.
///
/// First match in declaration order wins (each parent, then its children), not the
/// longest prefix.
pub fn active_item(items: &[VisibleNav], location: &str) -> Option<&'static str> {
    for it in items {
        if href_matches(it.href, location) { return Some(it.id); }
        for c in &it.children {
            if href_matches(c.href, location) { return Some(c.id); }
        }
    }
    None
}

fn href_matches(href: Option<&'static str>, location: &str) -> bool {
    href.map(NavHref::Path).map(|h| h.is_prefix_of(location)).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanded,
}

/// Expand/collapse state for one navigation surface instance.
#[derive(Debug, Clone, Default)]
pub struct NavState {
    parents: HashMap<&'static str, Expansion>,
}

impl NavState {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self, id: &str) -> Expansion { self.parents.get(id).copied().unwrap_or_default() }

    pub fn is_expanded(&self, id: &str) -> bool { self.state(id) == Expansion::Expanded }

    pub fn toggle(&mut self, id: &'static str) -> Expansion {
        let next = match self.state(id) {
            Expansion::Collapsed => Expansion::Expanded,
            Expansion::Expanded => Expansion::Collapsed,
        };
        self.parents.insert(id, next);
        next
    }

    pub fn visible_children<'a>(&self, item: &'a VisibleNav) -> &'a [VisibleChild] {
        if self.is_expanded(item.id) { &item.children } else { &[] }
    }
}
