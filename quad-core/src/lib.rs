//! QUAD Core - Entity Types
//!
//! Pure data structures with no behavior beyond validation. All other crates
//! depend on this. No I/O lives here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod datetime;
pub mod records;
pub mod resources;
pub mod schema;

pub use records::{
    Article, CampusDate, DiningMenuItem, HelpRequest, MenuItemReview, Organization, Placeholder,
    RecommendationRequest, Restaurant,
};
pub use schema::{FieldKind, FieldSpec, ResourceSpec, ValidationError};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Permission roles granted by the backend.
///
/// The wire format uses Spring-style role strings (`ROLE_USER`, `ROLE_ADMIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Parse a wire role string. Unknown roles are ignored by callers.
    pub fn from_wire(s: &str) -> Option<Role> {
        match s {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

/// The authenticated identity for the session.
///
/// Loaded once at startup; immutable until a logout/login transition.
/// Anonymous sessions are represented as `None` at the call sites, never as
/// an `Identity` with empty roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: Option<String>,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    pub fn new(email: Option<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            email,
            roles: roles.into_iter().collect(),
        }
    }
}

/// Role predicate used for route gating and control visibility.
///
/// Returns `false` for anonymous identities. Admin implies user-level access:
/// an identity holding only `ROLE_ADMIN` still satisfies a `ROLE_USER` check.
pub fn has_role(identity: Option<&Identity>, role: Role) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    match role {
        Role::Admin => identity.roles.contains(&Role::Admin),
        Role::User => identity.roles.contains(&Role::User) || identity.roles.contains(&Role::Admin),
    }
}
