//! Keyed query cache with in-flight deduplication.
//!
//! One explicitly constructed [`QueryCache`] per running application,
//! injected into every screen; there is no global singleton. The cache owns
//! every entry; consumers only ever see snapshots and change signals.
//!
//! Invariants:
//! - at most one in-flight fetch per key: concurrent callers join the
//!   existing request instead of issuing a duplicate;
//! - an entry is never partially updated: success replaces `data`
//!   atomically, failure touches only `status`/`error`.

use crate::descriptor::{CacheKey, RequestDescriptor};
use crate::error::ClientError;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one cached request's state.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Option<Value>,
    pub status: QueryStatus,
    pub error: Option<ClientError>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            last_updated: None,
        }
    }
}

struct EntrySlot {
    entry: CacheEntry,
    /// Remembered so `invalidate` can re-fetch for live subscribers.
    descriptor: Option<RequestDescriptor>,
    /// Present while a fetch is in flight; joiners wait on it.
    inflight: Option<watch::Receiver<bool>>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<()>)>,
}

impl EntrySlot {
    fn idle() -> Self {
        Self {
            entry: CacheEntry::idle(),
            descriptor: None,
            inflight: None,
            subscribers: Vec::new(),
        }
    }

    fn notify(&mut self) {
        self.subscribers.retain(|(_, tx)| tx.send(()).is_ok());
    }
}

struct CacheInner {
    transport: Arc<dyn Transport>,
    state: Mutex<HashMap<CacheKey, EntrySlot>>,
    next_subscriber_id: AtomicU64,
}

/// Cheaply clonable handle to the shared cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

/// Change signal for one cache key. Dropping it unsubscribes; no signals are
/// delivered after drop.
pub struct Subscription {
    cache: QueryCache,
    key: CacheKey,
    id: u64,
    rx: mpsc::UnboundedReceiver<()>,
}

impl Subscription {
    /// Wait for the next change to the subscribed entry.
    pub async fn changed(&mut self) {
        let _ = self.rx.recv().await;
    }

    /// Drain any pending change signal without blocking. Returns whether the
    /// entry changed since the last poll.
    pub fn take_change(&mut self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cache.unsubscribe(&self.key, self.id);
    }
}

enum FetchRole {
    /// This caller issues the HTTP request and settles the entry.
    Own(watch::Sender<bool>),
    /// Another fetch is in flight; wait for it and read the outcome.
    Join(watch::Receiver<bool>),
}

impl QueryCache {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                transport,
                state: Mutex::new(HashMap::new()),
                next_subscriber_id: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Lock poisoning means a panic mid-update; recover the guard and carry
    /// on, entries are always left whole between critical sections.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, EntrySlot>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the entry for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock().get(key).map(|slot| slot.entry.clone())
    }

    /// Register a change listener for `key`.
    pub fn subscribe(&self, key: &CacheKey) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .entry(key.clone())
            .or_insert_with(EntrySlot::idle)
            .subscribers
            .push((id, tx));
        Subscription {
            cache: self.clone(),
            key: key.clone(),
            id,
            rx,
        }
    }

    fn unsubscribe(&self, key: &CacheKey, id: u64) {
        if let Some(slot) = self.lock().get_mut(key) {
            slot.subscribers.retain(|(sid, _)| *sid != id);
        }
    }

    /// Fetch `key` via `descriptor`, deduplicating concurrent calls.
    ///
    /// The outcome is both stored in the entry (so subscribers and late
    /// readers can branch on status) and returned to the caller.
    pub async fn fetch(
        &self,
        key: &CacheKey,
        descriptor: &RequestDescriptor,
    ) -> Result<Value, ClientError> {
        let role = {
            let mut state = self.lock();
            let slot = state.entry(key.clone()).or_insert_with(EntrySlot::idle);
            if let Some(rx) = &slot.inflight {
                debug!(key = %key, "joining in-flight fetch");
                FetchRole::Join(rx.clone())
            } else {
                let (tx, rx) = watch::channel(false);
                slot.inflight = Some(rx);
                slot.descriptor = Some(descriptor.clone());
                slot.entry.status = QueryStatus::Loading;
                slot.notify();
                FetchRole::Own(tx)
            }
        };

        match role {
            FetchRole::Join(mut rx) => {
                let _ = rx.wait_for(|done| *done).await;
                self.read_outcome(key)
            }
            FetchRole::Own(tx) => {
                let result = self.inner.transport.send(descriptor).await;
                {
                    let mut state = self.lock();
                    if let Some(slot) = state.get_mut(key) {
                        match &result {
                            Ok(value) => {
                                slot.entry.data = Some(value.clone());
                                slot.entry.status = QueryStatus::Success;
                                slot.entry.error = None;
                                slot.entry.last_updated = Some(Utc::now());
                            }
                            Err(err) => {
                                // Prior data is left untouched on failure.
                                slot.entry.status = QueryStatus::Error;
                                slot.entry.error = Some(err.clone());
                            }
                        }
                        slot.inflight = None;
                        slot.notify();
                    }
                }
                let _ = tx.send(true);
                debug!(key = %key, ok = result.is_ok(), "fetch settled");
                result
            }
        }
    }

    fn read_outcome(&self, key: &CacheKey) -> Result<Value, ClientError> {
        let state = self.lock();
        let Some(slot) = state.get(key) else {
            // Entry dropped between completion and read (invalidate with no
            // subscribers); the joiner reports it as a transient failure.
            return Err(ClientError::Network("cache entry dropped".to_string()));
        };
        match slot.entry.status {
            QueryStatus::Success => Ok(slot.entry.data.clone().unwrap_or(Value::Null)),
            QueryStatus::Error => Err(slot
                .entry
                .error
                .clone()
                .unwrap_or_else(|| ClientError::Network("fetch failed".to_string()))),
            QueryStatus::Idle | QueryStatus::Loading => {
                Err(ClientError::Network("fetch did not settle".to_string()))
            }
        }
    }

    /// Mark `key` stale. With no live subscribers the entry is dropped; with
    /// subscribers the remembered request is re-fetched immediately (joining
    /// an in-flight fetch if one is outstanding).
    ///
    /// A fetch in flight counts as an observer: dropping its slot would
    /// orphan the in-flight marker, letting a subsequent `fetch` issue a
    /// duplicate request and the stale owner settle the recreated entry.
    /// Such a slot is kept; the waiting caller still gets its result.
    pub async fn invalidate(&self, key: &CacheKey) {
        let refetch = {
            let mut state = self.lock();
            let (drop_entry, refetch) = match state.get_mut(key) {
                None => (false, None),
                Some(slot) if slot.subscribers.is_empty() => (slot.inflight.is_none(), None),
                Some(slot) => (false, slot.descriptor.clone()),
            };
            if drop_entry {
                debug!(key = %key, "invalidate: dropping unobserved entry");
                state.remove(key);
            }
            refetch
        };
        if let Some(descriptor) = refetch {
            debug!(key = %key, "invalidate: re-fetching for subscribers");
            let _ = self.fetch(key, &descriptor).await;
        }
    }
}
