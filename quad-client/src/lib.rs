//! QUAD data-binding layer.
//!
//! Everything a screen is allowed to use from the backend lives here:
//! [`BoundQuery`] for reads, [`BoundMutation`] for writes,
//! [`current_identity`] for the session identity, and the injectable
//! [`QueryCache`] they share. Screens never talk HTTP directly and never
//! mutate cache entries; all writes go through `fetch`/`invalidate`.

pub mod cache;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod mutation;
pub mod query;
pub mod transport;

pub use cache::{CacheEntry, QueryCache, QueryStatus, Subscription};
pub use descriptor::{CacheKey, Method, RequestDescriptor};
pub use error::ClientError;
pub use identity::{current_identity, CURRENT_USER_URL};
pub use mutation::BoundMutation;
pub use query::BoundQuery;
pub use transport::{HttpTransport, Transport};
