//! Route guard and navigation filter properties over the built-in tables.

use permitdesk::identity::Role;
use permitdesk::navigation::{self, NavTable, Surface};
use permitdesk::routes::{self, Access, RouteDecision, View, NOT_FOUND_PATH, ROUTES};

const EVERY_ROLE: [Option<Role>; 3] = [None, Some(Role::Lgu), Some(Role::BusinessOwner)];

fn ids(role: Option<Role>, surface: Surface) -> Vec<&'static str> {
    navigation::filter(role, surface).into_iter().map(|n| n.id).collect()
}

#[test]
fn public_routes_render_even_without_a_role() {
    for path in ["/", "/login", "/signup", NOT_FOUND_PATH] {
        for r in EVERY_ROLE {
            assert!(matches!(routes::guard(r, path), RouteDecision::Render(_)), "{} as {:?}", path, r);
        }
    }
}

#[test]
fn protected_routes_need_a_listed_role() {
    for e in ROUTES {
        if let Access::Roles(set) = e.access {
            assert_eq!(routes::guard(None, e.path), RouteDecision::Redirect(NOT_FOUND_PATH));
            for r in Role::ALL {
                let got = routes::guard(Some(r), e.path);
                if set.contains(&r) {
                    assert_eq!(got, RouteDecision::Render(e.view));
                } else {
                    assert_eq!(got, RouteDecision::Redirect(NOT_FOUND_PATH));
                }
            }
        }
    }
}

#[test]
fn unknown_path_is_not_found_for_everyone() {
    for r in EVERY_ROLE {
        assert_eq!(routes::guard(r, "/permits/2024"), RouteDecision::Redirect(NOT_FOUND_PATH));
    }
}

#[test]
fn business_owner_end_to_end() {
    let role = Some(Role::BusinessOwner);
    assert_eq!(routes::guard(role, "/home"), RouteDecision::Redirect(NOT_FOUND_PATH));
    assert_eq!(routes::guard(role, "/biznest/form"), RouteDecision::Render(View::BusinessForm));
    let mobile = navigation::filter(role, Surface::Mobile);
    assert_eq!(mobile.iter().map(|n| n.label).collect::<Vec<_>>(), vec!["Business", "Settings"]);
}

#[test]
fn lgu_desktop_nav_in_declaration_order() {
    assert_eq!(ids(Some(Role::Lgu), Surface::Desktop), vec!["dashboard", "users", "settings", "maps"]);
}

#[test]
fn business_owner_mobile_nav_excludes_lgu_entries() {
    let got = ids(Some(Role::BusinessOwner), Surface::Mobile);
    assert_eq!(got, vec!["biznest-form", "settings"]);
    for excluded in ["dashboard", "maps", "users"] { assert!(!got.contains(&excluded)); }
}

#[test]
fn absent_role_gets_empty_nav_on_every_surface() {
    for s in [Surface::Desktop, Surface::Mobile] { assert!(ids(None, s).is_empty()); }
}

#[test]
fn every_nav_href_is_a_route_the_role_can_render() {
    let t = NavTable::default();
    for r in Role::ALL {
        for s in [Surface::Desktop, Surface::Mobile] {
            for item in t.filter(Some(r), s) {
                let hrefs = item.href.into_iter().chain(item.children.iter().filter_map(|c| c.href));
                for href in hrefs {
                    let path = href.split('#').next().unwrap_or(href);
                    assert!(
                        matches!(routes::guard(Some(r), path), RouteDecision::Render(_)),
                        "{:?} sees {} on {:?} but cannot open it", r, href, s
                    );
                }
            }
        }
    }
}
