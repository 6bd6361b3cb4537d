//! Fetch-through with per-key request coalescing

use super::keys::CacheKey;
use super::store::{CacheStore, Flight, FlightFuture};
use futures::future::{FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

enum Lookup<V, E> {
    Hit(V),
    Joined(Shared<FlightFuture<V, E>>),
    Miss,
}

impl<V, E> CacheStore<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + std::fmt::Display + 'static,
{
    /// Return the cached value for `key`, or run `producer` to fill it.
    ///
    /// Concurrent callers for the same key share a single producer run and all
    /// receive its outcome. A successful value is stored before any caller sees
    /// it; a failure is handed to every waiter and never stored. If every waiter
    /// is dropped the run is abandoned and the next caller starts a fresh one.
    pub async fn fetch_through<F, Fut>(&self, key: &CacheKey, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let slot = key.to_string();

        match self.lookup(&slot) {
            Lookup::Hit(value) => return Ok(value),
            Lookup::Joined(run) => return run.await,
            Lookup::Miss => {}
        }

        let run = {
            let mut inner = self.inner.lock();
            if let Some(value) = inner.get_fresh(&slot, self.clock.now()) {
                debug!("Cache hit for key: {} (filled concurrently)", slot);
                return Ok(value);
            }
            if let Some(existing) = inner.in_flight.get(&slot).and_then(|f| f.run.upgrade()) {
                debug!("Joining in-flight fetch for key: {}", slot);
                existing
            } else {
                // Only the caller that registers the flight builds the producer future
                inner.prune_flights();
                let id = inner.next_flight;
                inner.next_flight += 1;
                let run = self.flight(slot.clone(), id, ttl, producer());
                if let Some(weak) = run.downgrade() {
                    inner.in_flight.insert(slot.clone(), Flight { id, run: weak });
                }
                debug!("Cache miss for key: {}, starting fetch", slot);
                run
            }
        };

        run.await
    }

    fn lookup(&self, slot: &str) -> Lookup<V, E> {
        let mut inner = self.inner.lock();
        if let Some(value) = inner.get_fresh(slot, self.clock.now()) {
            debug!("Cache hit for key: {}", slot);
            return Lookup::Hit(value);
        }
        match inner.in_flight.get(slot).and_then(|f| f.run.upgrade()) {
            Some(run) => {
                debug!("Joining in-flight fetch for key: {}", slot);
                Lookup::Joined(run)
            }
            None => Lookup::Miss,
        }
    }

    /// Wrap `work` so its outcome is recorded before it reaches any waiter
    fn flight<Fut>(&self, slot: String, id: u64, ttl: Duration, work: Fut) -> Shared<FlightFuture<V, E>>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let name = self.name;
        let inner = Arc::clone(&self.inner);
        let clock = Arc::clone(&self.clock);
        let high_water_mark = self.high_water_mark;

        async move {
            let outcome = work.await;
            let mut guard = inner.lock();
            if guard.in_flight.get(&slot).is_some_and(|f| f.id == id) {
                guard.in_flight.remove(&slot);
            }
            match &outcome {
                Ok(value) => {
                    debug!("Cached value for key: {} with TTL: {:?}", slot, ttl);
                    guard.insert(name, slot, value.clone(), ttl, clock.now(), high_water_mark);
                }
                Err(e) => warn!("Fetch for key {} failed, not caching: {}", slot, e),
            }
            outcome
        }
        .boxed()
        .shared()
    }
}
