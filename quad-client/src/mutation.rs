//! Write binding: a mutation with a fixed invalidation set.

use crate::cache::QueryCache;
use crate::descriptor::{CacheKey, RequestDescriptor};
use crate::error::ClientError;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

type SuccessCallback = Box<dyn Fn(&Value) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&ClientError) + Send + Sync>;

#[derive(Default)]
struct MutationState {
    succeeded: bool,
    last_error: Option<ClientError>,
}

/// Binds a request builder to the cache keys it must invalidate on success.
///
/// The invalidation set is fixed at construction: pass the exact literal
/// list of keys the mutation affects (e.g. the list endpoint's key), not a
/// value recomputed per call.
///
/// At most one mutation per handle is in flight; a second [`mutate`] before
/// the first resolves is rejected with [`ClientError::MutationPending`]
/// without issuing a request. Queueing would reorder invalidations behind
/// later calls, so it was rejected.
///
/// [`mutate`]: BoundMutation::mutate
pub struct BoundMutation<I> {
    cache: QueryCache,
    build_request: Box<dyn Fn(&I) -> RequestDescriptor + Send + Sync>,
    invalidate_keys: Vec<CacheKey>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    pending: AtomicBool,
    state: Mutex<MutationState>,
}

impl<I> BoundMutation<I> {
    pub fn new(
        cache: &QueryCache,
        build_request: impl Fn(&I) -> RequestDescriptor + Send + Sync + 'static,
        invalidate_keys: Vec<CacheKey>,
    ) -> Self {
        Self {
            cache: cache.clone(),
            build_request: Box::new(build_request),
            invalidate_keys,
            on_success: None,
            on_error: None,
            pending: AtomicBool::new(false),
            state: Mutex::new(MutationState::default()),
        }
    }

    pub fn on_success(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Build the descriptor from `input`, issue the call, and on success
    /// invoke `on_success` with the response body, then invalidate every
    /// configured key (forcing subscribed reads to re-fetch).
    ///
    /// Failures are reported to `on_error`, recorded on the handle, and
    /// returned, never swallowed.
    pub async fn mutate(&self, input: &I) -> Result<Value, ClientError> {
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("mutation rejected: one already in flight");
            return Err(ClientError::MutationPending);
        }

        let descriptor = (self.build_request)(input);
        let result = self.cache.transport().send(&descriptor).await;

        match &result {
            Ok(body) => {
                {
                    let mut state = self.state_lock();
                    state.succeeded = true;
                    state.last_error = None;
                }
                if let Some(callback) = &self.on_success {
                    callback(body);
                }
                for key in &self.invalidate_keys {
                    self.cache.invalidate(key).await;
                }
            }
            Err(err) => {
                {
                    let mut state = self.state_lock();
                    state.last_error = Some(err.clone());
                }
                if let Some(callback) = &self.on_error {
                    callback(err);
                }
            }
        }

        self.pending.store(false, Ordering::SeqCst);
        result
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Whether any call on this handle has succeeded.
    pub fn is_success(&self) -> bool {
        self.state_lock().succeeded
    }

    /// The most recent request failure, if any.
    pub fn last_error(&self) -> Option<ClientError> {
        self.state_lock().last_error.clone()
    }

    pub fn invalidate_keys(&self) -> &[CacheKey] {
        &self.invalidate_keys
    }

    fn state_lock(&self) -> std::sync::MutexGuard<'_, MutationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
