//! Application state.
//!
//! Navigation goes through the route table: a screen is only constructed
//! when the current identity resolves its route, so gated screens are never
//! mounted (and never fetch) for identities lacking the role.

use crate::config::TuiConfig;
use crate::nav::{AuthState, RouteTable, RouteTarget};
use crate::notifications::{Notification, NotificationLevel};
use crate::screen::ResourceScreen;
use quad_client::{BoundQuery, CacheKey, QueryCache, RequestDescriptor};
use quad_core::{has_role, Identity, Role};
use serde_json::json;
use tracing::info;

const ADMIN_USERS_URL: &str = "/api/admin/users";

pub enum ActiveScreen {
    Home,
    Profile,
    Users(BoundQuery),
    Resource(ResourceScreen),
}

pub struct App {
    pub config: TuiConfig,
    pub cache: QueryCache,
    pub routes: RouteTable,
    pub identity: Option<Identity>,
    pub auth: AuthState,
    pub path: String,
    pub screen: ActiveScreen,
    pub notifications: Vec<Notification>,
}

impl App {
    pub fn new(config: TuiConfig, cache: QueryCache) -> Self {
        Self {
            config,
            cache,
            routes: RouteTable::standard(),
            identity: None,
            auth: AuthState::Unauthenticated,
            path: "/".to_string(),
            screen: ActiveScreen::Home,
            notifications: Vec::new(),
        }
    }

    /// Install the identity loaded at startup (or after a login change) and
    /// drop back to Home if the current path is no longer reachable.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.auth = AuthState::from_identity(identity.as_ref());
        self.identity = identity;
        if self.routes.resolve(&self.path, self.identity.as_ref()).is_none() {
            self.path = "/".to_string();
            self.screen = ActiveScreen::Home;
        }
    }

    pub fn is_admin(&self) -> bool {
        has_role(self.identity.as_ref(), Role::Admin)
    }

    /// Navigate to `path`. Unresolvable paths (unknown, or gated beyond the
    /// identity's roles) leave the current screen in place and return false.
    pub fn navigate(&mut self, path: &str) -> bool {
        let Some(route) = self.routes.resolve(path, self.identity.as_ref()) else {
            return false;
        };
        let target = route.target;
        let path = route.path.clone();

        info!(%path, "navigate");
        let is_admin = self.is_admin();
        self.screen = match target {
            RouteTarget::Home => ActiveScreen::Home,
            RouteTarget::Profile => ActiveScreen::Profile,
            RouteTarget::AdminUsers => ActiveScreen::Users(BoundQuery::mount(
                &self.cache,
                CacheKey::from_path(ADMIN_USERS_URL),
                RequestDescriptor::get(ADMIN_USERS_URL),
                json!([]),
            )),
            RouteTarget::Index(spec) => {
                ActiveScreen::Resource(ResourceScreen::mount(&self.cache, spec, is_admin))
            }
            RouteTarget::Create(spec) => {
                let mut screen = ResourceScreen::mount(&self.cache, spec, is_admin);
                screen.open_create();
                ActiveScreen::Resource(screen)
            }
            // No row is selected yet when arriving by path; the edit form
            // opens from the list once a row is picked.
            RouteTarget::Edit(spec) => {
                ActiveScreen::Resource(ResourceScreen::mount(&self.cache, spec, is_admin))
            }
        };
        self.path = path;
        true
    }

    /// Tab/BackTab cycling across the identity's navigable routes.
    pub fn next_screen(&mut self) {
        self.cycle(1);
    }

    pub fn prev_screen(&mut self) {
        self.cycle(-1);
    }

    /// Jump to the nth navigable route (number keys).
    pub fn switch_screen(&mut self, index: usize) {
        let paths: Vec<String> = self
            .routes
            .navigable(self.identity.as_ref())
            .iter()
            .map(|r| r.path.clone())
            .collect();
        if let Some(path) = paths.get(index) {
            let path = path.clone();
            self.navigate(&path);
        }
    }

    fn cycle(&mut self, step: isize) {
        let paths: Vec<String> = self
            .routes
            .navigable(self.identity.as_ref())
            .iter()
            .map(|r| r.path.clone())
            .collect();
        if paths.is_empty() {
            return;
        }
        let current = paths.iter().position(|p| *p == self.path).unwrap_or(0) as isize;
        let len = paths.len() as isize;
        let next = (current + step).rem_euclid(len) as usize;
        let path = paths[next].clone();
        self.navigate(&path);
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        // Footer shows the tail; keep the list from growing unbounded.
        if self.notifications.len() > 50 {
            self.notifications.remove(0);
        }
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Wait for the active screen's bound data to change. Static screens
    /// never resolve; callers race this against input in a `select!`.
    pub async fn screen_changed(&mut self) {
        match &mut self.screen {
            ActiveScreen::Users(query) => query.changed().await,
            ActiveScreen::Resource(screen) => screen.changed().await,
            ActiveScreen::Home | ActiveScreen::Profile => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quad_client::{ClientError, Transport};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _descriptor: &RequestDescriptor) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!([]))
        }
    }

    fn app() -> (App, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let cache = QueryCache::new(transport.clone());
        let config = TuiConfig {
            api_base_url: "http://localhost:8080".to_string(),
            auth: crate::config::AuthConfig {
                token: None,
                refresh_token: None,
            },
            request_timeout_ms: 5_000,
            refresh_interval_ms: 30_000,
            persistence_path: PathBuf::from("/tmp/quad-state.json"),
            error_log_path: PathBuf::from("/tmp/quad-errors.log"),
        };
        (App::new(config, cache), transport)
    }

    fn user() -> Identity {
        Identity::new(Some("student@ucsb.edu".to_string()), [Role::User])
    }

    fn admin() -> Identity {
        Identity::new(Some("phtcon@ucsb.edu".to_string()), [Role::User, Role::Admin])
    }

    #[tokio::test]
    async fn anonymous_cannot_mount_gated_screens() {
        let (mut app, transport) = app();
        assert!(!app.navigate("/helprequest"));
        assert!(!app.navigate("/admin/users"));
        assert!(matches!(app.screen, ActiveScreen::Home));
        // No screen mounted, so nothing was fetched.
        tokio::task::yield_now().await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn user_mounts_index_screen_without_write_access() {
        let (mut app, _) = app();
        app.set_identity(Some(user()));
        assert!(app.navigate("/helprequest"));
        match &app.screen {
            ActiveScreen::Resource(screen) => assert!(!screen.can_write),
            _ => panic!("expected a resource screen"),
        }
        assert!(!app.navigate("/helprequest/create"));
    }

    #[tokio::test]
    async fn admin_create_route_opens_the_form() {
        let (mut app, _) = app();
        app.set_identity(Some(admin()));
        assert!(app.navigate("/helprequest/create"));
        match &app.screen {
            ActiveScreen::Resource(screen) => {
                assert!(screen.can_write);
                assert!(screen.form.is_some());
            }
            _ => panic!("expected a resource screen"),
        }
    }

    #[tokio::test]
    async fn losing_a_role_drops_back_to_home() {
        let (mut app, _) = app();
        app.set_identity(Some(admin()));
        assert!(app.navigate("/admin/users"));
        app.set_identity(Some(user()));
        assert_eq!(app.path, "/");
        assert!(matches!(app.screen, ActiveScreen::Home));
    }

    #[tokio::test]
    async fn tab_cycles_only_through_navigable_routes() {
        let (mut app, _) = app();
        app.set_identity(Some(user()));
        let navigable: Vec<String> = app
            .routes
            .navigable(app.identity.as_ref())
            .iter()
            .map(|r| r.path.clone())
            .collect();

        for expected in navigable.iter().skip(1) {
            app.next_screen();
            assert_eq!(&app.path, expected);
        }
        app.next_screen();
        assert_eq!(app.path, navigable[0]);

        app.prev_screen();
        assert_eq!(&app.path, navigable.last().unwrap());
    }

    #[tokio::test]
    async fn notifications_are_capped() {
        let (mut app, _) = app();
        for i in 0..60 {
            app.notify(NotificationLevel::Info, format!("n{i}"));
        }
        assert_eq!(app.notifications.len(), 50);
        assert_eq!(app.latest_notification().unwrap().message, "n59");
    }
}
