//! In-memory TTL store with lazy expiry and a size-triggered sweep

use super::clock::{Clock, SystemClock};
use super::keys::CacheKey;
use futures::future::{BoxFuture, WeakShared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default number of entries above which a set triggers a sweep
pub const DEFAULT_HIGH_WATER_MARK: usize = 500;

pub(super) type FlightFuture<V, E> = BoxFuture<'static, Result<V, E>>;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// A producer run other callers can attach to
pub(super) struct Flight<V, E> {
    pub(super) id: u64,
    pub(super) run: WeakShared<FlightFuture<V, E>>,
}

pub(super) struct Inner<V, E> {
    entries: HashMap<String, CacheEntry<V>>,
    pub(super) in_flight: HashMap<String, Flight<V, E>>,
    pub(super) next_flight: u64,
}

impl<V: Clone, E> Inner<V, E> {
    /// Fresh value for `key`, dropping the entry if it has gone stale
    pub(super) fn get_fresh(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub(super) fn insert(
        &mut self,
        store: &'static str,
        key: String,
        value: V,
        ttl: Duration,
        now: Instant,
        high_water_mark: usize,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );

        if self.entries.len() > high_water_mark {
            self.sweep(store, now);
        }
    }

    /// Drop markers of runs every waiter has abandoned
    pub(super) fn prune_flights(&mut self) {
        self.in_flight.retain(|_, flight| flight.run.upgrade().is_some());
    }

    fn sweep(&mut self, store: &'static str, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.prune_flights();

        let removed = before - self.entries.len();
        if removed > 0 {
            info!("Swept {} expired entries from {} cache ({} remain)", removed, store, self.entries.len());
        } else {
            debug!("Sweep of {} cache found nothing expired ({} entries)", store, before);
        }
    }
}

/// Keyed TTL cache shared across handlers.
///
/// Cloning is cheap and every clone sees the same entries. `E` is the error type
/// producers return through [`CacheStore::fetch_through`].
pub struct CacheStore<V, E> {
    pub(super) name: &'static str,
    pub(super) inner: Arc<Mutex<Inner<V, E>>>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) high_water_mark: usize,
}

impl<V, E> Clone for CacheStore<V, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
            high_water_mark: self.high_water_mark,
        }
    }
}

impl<V: Clone, E> CacheStore<V, E> {
    /// Create a store on the system clock
    pub fn new(name: &'static str, high_water_mark: usize) -> Self {
        Self::with_clock(name, high_water_mark, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &'static str, high_water_mark: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                next_flight: 0,
            })),
            clock,
            high_water_mark,
        }
    }

    /// Cached value for `key` if it is still within its TTL
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let slot = key.to_string();
        let now = self.clock.now();
        let result = self.inner.lock().get_fresh(&slot, now);
        if result.is_some() {
            debug!("Cache hit for key: {}", slot);
        } else {
            debug!("Cache miss for key: {}", slot);
        }
        result
    }

    /// Store `value` under `key`, replacing any previous entry and restarting its TTL
    pub fn set(&self, key: &CacheKey, value: V, ttl: Duration) {
        let slot = key.to_string();
        let now = self.clock.now();
        debug!("Cached value for key: {} with TTL: {:?}", slot, ttl);
        self.inner
            .lock()
            .insert(self.name, slot, value, ttl, now, self.high_water_mark);
    }

    /// Number of stored entries, stale ones included until they are read or swept
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of producer runs currently outstanding
    pub fn in_flight(&self) -> usize {
        self.inner
            .lock()
            .in_flight
            .values()
            .filter(|flight| flight.run.upgrade().is_some())
            .count()
    }

    /// Markers in the in-flight map, abandoned runs not yet pruned included
    #[cfg(test)]
    pub(crate) fn flight_markers(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
