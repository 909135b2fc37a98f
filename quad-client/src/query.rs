//! Read binding: a subscribed, cache-backed view of one GET request.

use crate::cache::{QueryCache, QueryStatus, Subscription};
use crate::descriptor::{CacheKey, RequestDescriptor};
use crate::error::ClientError;
use serde_json::Value;

/// Binds one request to the cache for the lifetime of a screen.
///
/// `data()` returns the supplied initial value until the first successful
/// fetch, so screens render immediately without a definedness check.
/// Dropping the handle unsubscribes; an in-flight request is not cancelled
/// and still settles the shared entry for other subscribers.
pub struct BoundQuery {
    cache: QueryCache,
    key: CacheKey,
    descriptor: RequestDescriptor,
    initial: Value,
    subscription: Subscription,
}

impl BoundQuery {
    /// Subscribe to `key` and trigger a fetch if nothing is cached yet. The
    /// fetch runs in the background; the handle is usable immediately.
    pub fn mount(
        cache: &QueryCache,
        key: CacheKey,
        descriptor: RequestDescriptor,
        initial: Value,
    ) -> Self {
        let subscription = cache.subscribe(&key);
        let needs_fetch = cache
            .get(&key)
            .map_or(true, |entry| matches!(entry.status, QueryStatus::Idle));
        if needs_fetch {
            let cache = cache.clone();
            let key = key.clone();
            let descriptor = descriptor.clone();
            tokio::spawn(async move {
                // Errors land in the entry for subscribers to observe.
                let _ = cache.fetch(&key, &descriptor).await;
            });
        }
        Self {
            cache: cache.clone(),
            key,
            descriptor,
            initial,
            subscription,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Current data, or the initial value before the first success.
    pub fn data(&self) -> Value {
        self.cache
            .get(&self.key)
            .and_then(|entry| entry.data)
            .unwrap_or_else(|| self.initial.clone())
    }

    pub fn status(&self) -> QueryStatus {
        self.cache
            .get(&self.key)
            .map_or(QueryStatus::Idle, |entry| entry.status)
    }

    pub fn error(&self) -> Option<ClientError> {
        self.cache.get(&self.key).and_then(|entry| entry.error)
    }

    /// Wait for the next change to this entry (the re-render signal).
    pub async fn changed(&mut self) {
        self.subscription.changed().await;
    }

    /// Drain any pending change signal without blocking.
    pub fn take_change(&mut self) -> bool {
        self.subscription.take_change()
    }

    /// Invalidate and await the resulting fetch; for refreshing after
    /// mutations this query does not own (e.g. a delete confirmed by the
    /// server). Returns the server's canonical data.
    pub async fn refresh(&self) -> Result<Value, ClientError> {
        self.cache.invalidate(&self.key).await;
        match self.cache.get(&self.key) {
            Some(entry) if entry.status == QueryStatus::Success => {
                Ok(entry.data.unwrap_or(Value::Null))
            }
            Some(entry) if entry.status == QueryStatus::Error => Err(entry
                .error
                .unwrap_or_else(|| ClientError::Network("refresh failed".to_string()))),
            // The entry vanished or never settled; fetch directly.
            _ => self.cache.fetch(&self.key, &self.descriptor).await,
        }
    }
}
