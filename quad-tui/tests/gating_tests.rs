//! Property tests for route gating, keybindings, and config validation.

use proptest::prelude::*;
use quad_core::{Identity, Role};
use quad_tui::config::{AuthConfig, TuiConfig};
use quad_tui::keys::{map_key, Action};
use quad_tui::nav::{AuthState, RouteTable};
use std::collections::HashSet;
use std::path::PathBuf;

fn arb_identity() -> impl Strategy<Value = Option<Identity>> {
    prop_oneof![
        1 => Just(None),
        4 => (any::<bool>(), any::<bool>(), proptest::option::of("[a-z]{3,8}@ucsb\\.edu"))
            .prop_map(|(user, admin, email)| {
                let mut roles = Vec::new();
                if user {
                    roles.push(Role::User);
                }
                if admin {
                    roles.push(Role::Admin);
                }
                Some(Identity::new(email, roles))
            }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The active set never contains a path the full table lacks, and its
    /// paths stay unique.
    #[test]
    fn active_routes_are_a_unique_subset(identity in arb_identity()) {
        let table = RouteTable::standard();
        let all: HashSet<_> = table.routes().iter().map(|r| r.path.clone()).collect();
        let mut seen = HashSet::new();
        for route in table.active(identity.as_ref()) {
            prop_assert!(all.contains(&route.path));
            prop_assert!(seen.insert(route.path.clone()));
        }
    }

    /// Every identity reaches at least the anonymous (public) routes.
    #[test]
    fn public_routes_are_always_reachable(identity in arb_identity()) {
        let table = RouteTable::standard();
        let public: Vec<_> = table.active(None).iter().map(|r| r.path.clone()).collect();
        let active: HashSet<_> = table
            .active(identity.as_ref())
            .iter()
            .map(|r| r.path.clone())
            .collect();
        for path in public {
            prop_assert!(active.contains(&path));
        }
    }

    /// An identity holding the admin role resolves every route in the table,
    /// including the user-gated ones (admin implies user).
    #[test]
    fn admin_role_unlocks_everything(email in proptest::option::of("[a-z]{3,8}@ucsb\\.edu"), with_user in any::<bool>()) {
        let mut roles = vec![Role::Admin];
        if with_user {
            roles.push(Role::User);
        }
        let identity = Identity::new(email, roles);
        let table = RouteTable::standard();
        for route in table.routes() {
            prop_assert!(
                table.resolve(&route.path, Some(&identity)).is_some(),
                "admin could not resolve {}",
                route.path
            );
        }
        prop_assert_eq!(AuthState::from_identity(Some(&identity)), AuthState::AuthenticatedAdmin);
    }

    /// Without the admin role, no admin-gated route resolves.
    #[test]
    fn admin_routes_stay_locked_without_the_role(email in proptest::option::of("[a-z]{3,8}@ucsb\\.edu"), with_user in any::<bool>()) {
        let roles = if with_user { vec![Role::User] } else { Vec::new() };
        let identity = Identity::new(email, roles);
        let table = RouteTable::standard();
        for route in table.routes() {
            if route.required_role == Some(Role::Admin) {
                prop_assert!(table.resolve(&route.path, Some(&identity)).is_none());
            }
        }
    }

    /// resolve() agrees with membership in the active set.
    #[test]
    fn resolve_matches_active_membership(identity in arb_identity()) {
        let table = RouteTable::standard();
        let active: HashSet<_> = table
            .active(identity.as_ref())
            .iter()
            .map(|r| r.path.clone())
            .collect();
        for route in table.routes() {
            let resolved = table.resolve(&route.path, identity.as_ref());
            prop_assert_eq!(resolved.is_some(), active.contains(&route.path));
            if let Some(resolved) = resolved {
                prop_assert_eq!(&resolved.path, &route.path);
            }
        }
    }

    /// Digit keys map onto screen slots zero-based, with 0 meaning the tenth.
    #[test]
    fn digit_keys_map_to_screen_indices(digit in 0u32..10) {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let c = char::from_digit(digit, 10).unwrap();
        let expected = if digit == 0 { 9 } else { (digit - 1) as usize };
        let action = map_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        prop_assert_eq!(action, Some(Action::SwitchScreen(expected)));
    }

    /// Timeouts and intervals must be positive for a config to validate.
    #[test]
    fn zero_durations_never_validate(timeout in 0u64..2, interval in 0u64..2) {
        let config = TuiConfig {
            api_base_url: "http://localhost:8080".to_string(),
            auth: AuthConfig { token: None, refresh_token: None },
            request_timeout_ms: timeout,
            refresh_interval_ms: interval,
            persistence_path: PathBuf::from("/tmp/quad-state.json"),
            error_log_path: PathBuf::from("/tmp/quad-errors.log"),
        };
        let valid = config.validate().is_ok();
        prop_assert_eq!(valid, timeout > 0 && interval > 0);
    }
}

#[test]
fn base_url_scheme_is_enforced() {
    let mut config = TuiConfig {
        api_base_url: "localhost:8080".to_string(),
        auth: AuthConfig {
            token: None,
            refresh_token: None,
        },
        request_timeout_ms: 5_000,
        refresh_interval_ms: 30_000,
        persistence_path: PathBuf::from("/tmp/quad-state.json"),
        error_log_path: PathBuf::from("/tmp/quad-errors.log"),
    };
    assert!(config.validate().is_err());
    config.api_base_url = "https://quad.example.edu".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn refresh_token_requires_a_token() {
    let config = TuiConfig {
        api_base_url: "http://localhost:8080".to_string(),
        auth: AuthConfig {
            token: None,
            refresh_token: Some("r1".to_string()),
        },
        request_timeout_ms: 5_000,
        refresh_interval_ms: 30_000,
        persistence_path: PathBuf::from("/tmp/quad-state.json"),
        error_log_path: PathBuf::from("/tmp/quad-errors.log"),
    };
    assert!(config.validate().is_err());
}
