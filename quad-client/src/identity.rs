//! Session identity, loaded once through the shared cache.

use crate::cache::QueryCache;
use crate::descriptor::{CacheKey, RequestDescriptor};
use crate::error::ClientError;
use quad_core::{Identity, Role};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

pub const CURRENT_USER_URL: &str = "/api/currentUser";

/// Load the current identity, or `None` for an anonymous session.
///
/// Goes through the cache so the router and every screen share one load. A
/// 401/403 is the backend's anonymous marker, not an error; other failures
/// are logged and also treated as anonymous so the app degrades to the
/// public route set instead of crashing at startup.
pub async fn current_identity(cache: &QueryCache) -> Option<Identity> {
    let key = CacheKey::from_path(CURRENT_USER_URL);
    let descriptor = RequestDescriptor::get(CURRENT_USER_URL);
    match cache.fetch(&key, &descriptor).await {
        Ok(body) => parse_identity(&body),
        Err(ClientError::Http { status: 401, .. }) | Err(ClientError::Http { status: 403, .. }) => {
            None
        }
        Err(err) => {
            warn!(error = %err, "currentUser load failed; continuing as anonymous");
            None
        }
    }
}

/// Extract an [`Identity`] from the `/api/currentUser` body. Unknown role
/// strings are ignored; an empty or missing role set means anonymous.
pub fn parse_identity(body: &Value) -> Option<Identity> {
    if body.get("loggedIn").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let roles: BTreeSet<Role> = body
        .get("roles")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .filter_map(Role::from_wire)
        .collect();
    if roles.is_empty() {
        return None;
    }
    let email = body
        .get("email")
        .or_else(|| body.get("user").and_then(|user| user.get("email")))
        .and_then(Value::as_str)
        .map(String::from);
    Some(Identity { email, roles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_admin_identity() {
        let body = json!({
            "user": { "email": "phtcon@ucsb.edu" },
            "roles": ["ROLE_USER", "ROLE_ADMIN"]
        });
        let identity = parse_identity(&body).unwrap();
        assert_eq!(identity.email.as_deref(), Some("phtcon@ucsb.edu"));
        assert!(identity.roles.contains(&Role::Admin));
    }

    #[test]
    fn anonymous_markers() {
        assert_eq!(parse_identity(&json!({ "loggedIn": false })), None);
        assert_eq!(parse_identity(&json!({ "roles": [] })), None);
        assert_eq!(parse_identity(&json!({})), None);
    }

    #[test]
    fn unknown_roles_ignored() {
        let body = json!({ "email": "x@ucsb.edu", "roles": ["ROLE_MEMBER", "ROLE_USER"] });
        let identity = parse_identity(&body).unwrap();
        assert_eq!(identity.roles.len(), 1);
        assert!(identity.roles.contains(&Role::User));
    }
}
