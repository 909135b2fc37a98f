//! Role-gated routing.
//!
//! The route table is built once from the resource registry; which routes
//! are active is recomputed from the current identity. A gated route is
//! never materialized into a screen without its required role, so an
//! unauthorized screen cannot even start fetching.
//!
//! Each path is registered exactly once (asserted by tests); the duplicate
//! registrations the product previously shipped are gone.

use quad_core::schema::ResourceSpec;
use quad_core::{has_role, resources, Identity, Role};

/// Authentication state derived from the loaded identity.
///
/// The admin route set is a strict superset of the user route set; logout
/// returns to `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AuthState {
    pub fn from_identity(identity: Option<&Identity>) -> Self {
        if has_role(identity, Role::Admin) {
            AuthState::AuthenticatedAdmin
        } else if has_role(identity, Role::User) {
            AuthState::AuthenticatedUser
        } else {
            AuthState::Unauthenticated
        }
    }
}

/// What a route materializes into when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Home,
    Profile,
    AdminUsers,
    Index(&'static ResourceSpec),
    Create(&'static ResourceSpec),
    Edit(&'static ResourceSpec),
}

#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub required_role: Option<Role>,
    pub target: RouteTarget,
}

pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The application's full route table: public routes, one index route
    /// per resource for users, create/edit routes and the users page for
    /// admins.
    pub fn standard() -> Self {
        let mut routes = vec![
            Route {
                path: "/".to_string(),
                required_role: None,
                target: RouteTarget::Home,
            },
            Route {
                path: "/profile".to_string(),
                required_role: None,
                target: RouteTarget::Profile,
            },
            Route {
                path: "/admin/users".to_string(),
                required_role: Some(Role::Admin),
                target: RouteTarget::AdminUsers,
            },
        ];
        for spec in resources::all() {
            routes.push(Route {
                path: spec.ui_path.to_string(),
                required_role: Some(Role::User),
                target: RouteTarget::Index(spec),
            });
            routes.push(Route {
                path: format!("{}/create", spec.ui_path),
                required_role: Some(Role::Admin),
                target: RouteTarget::Create(spec),
            });
            routes.push(Route {
                path: format!("{}/edit", spec.ui_path),
                required_role: Some(Role::Admin),
                target: RouteTarget::Edit(spec),
            });
        }
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes the identity may reach. Anonymous identities see only the
    /// public set.
    pub fn active(&self, identity: Option<&Identity>) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| match route.required_role {
                None => true,
                Some(role) => has_role(identity, role),
            })
            .collect()
    }

    /// Resolve a path against the active set. Gated paths resolve to `None`
    /// for identities lacking the role.
    pub fn resolve(&self, path: &str, identity: Option<&Identity>) -> Option<&Route> {
        self.active(identity)
            .into_iter()
            .find(|route| route.path == path)
    }

    /// The index (list) routes the identity can navigate between with
    /// Tab/BackTab, Home and Profile included.
    pub fn navigable(&self, identity: Option<&Identity>) -> Vec<&Route> {
        self.active(identity)
            .into_iter()
            .filter(|route| {
                matches!(
                    route.target,
                    RouteTarget::Home
                        | RouteTarget::Profile
                        | RouteTarget::AdminUsers
                        | RouteTarget::Index(_)
                )
            })
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn user() -> Identity {
        Identity::new(Some("student@ucsb.edu".to_string()), [Role::User])
    }

    fn admin() -> Identity {
        Identity::new(Some("phtcon@ucsb.edu".to_string()), [Role::User, Role::Admin])
    }

    #[test]
    fn each_path_registered_exactly_once() {
        let table = RouteTable::standard();
        let mut seen = HashSet::new();
        for route in table.routes() {
            assert!(seen.insert(route.path.clone()), "duplicate: {}", route.path);
        }
    }

    #[test]
    fn anonymous_sees_only_public_routes() {
        let table = RouteTable::standard();
        let active = table.active(None);
        let paths: Vec<_> = active.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/profile"]);
        assert!(table.resolve("/helprequest", None).is_none());
    }

    #[test]
    fn user_gets_index_routes_but_not_admin_routes() {
        let table = RouteTable::standard();
        let identity = user();
        assert!(table.resolve("/helprequest", Some(&identity)).is_some());
        assert!(table.resolve("/helprequest/create", Some(&identity)).is_none());
        assert!(table.resolve("/admin/users", Some(&identity)).is_none());
    }

    #[test]
    fn admin_set_is_strict_superset_of_user_set() {
        let table = RouteTable::standard();
        let user_identity = user();
        let admin_identity = admin();
        let user_paths: HashSet<_> = table
            .active(Some(&user_identity))
            .iter()
            .map(|r| r.path.clone())
            .collect();
        let admin_paths: HashSet<_> = table
            .active(Some(&admin_identity))
            .iter()
            .map(|r| r.path.clone())
            .collect();
        assert!(admin_paths.is_superset(&user_paths));
        assert!(admin_paths.len() > user_paths.len());
    }

    #[test]
    fn auth_state_transitions() {
        assert_eq!(AuthState::from_identity(None), AuthState::Unauthenticated);
        assert_eq!(
            AuthState::from_identity(Some(&user())),
            AuthState::AuthenticatedUser
        );
        assert_eq!(
            AuthState::from_identity(Some(&admin())),
            AuthState::AuthenticatedAdmin
        );
        // Admin-only identities still reach user-level routes.
        let admin_only = Identity::new(None, [Role::Admin]);
        assert_eq!(
            AuthState::from_identity(Some(&admin_only)),
            AuthState::AuthenticatedAdmin
        );
        let table = RouteTable::standard();
        assert!(table.resolve("/helprequest", Some(&admin_only)).is_some());
    }
}
