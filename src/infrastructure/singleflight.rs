//! Request coalescing for concurrent async work
//!
//! Collapses concurrent cold-cache fetches for the same key into a single
//! upstream call: the first arriver claims the key and spawns the work, all
//! later arrivers await the same shared outcome. The claim-or-attach step
//! uses the map's entry API, so two arrivers can never both become leader.
//!
//! The work runs on its own task. A caller that times out or is dropped
//! detaches from the outcome without cancelling the in-flight call, since
//! other waiters may still need the result.

use crate::domain::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

/// Errors cross the shared channel as strings: the domain error is not
/// `Clone`, and the coalesced outcome is opaque to waiters anyway.
type FlightOutcome<V> = std::result::Result<V, String>;
type FlightFuture<V> = Shared<oneshot::Receiver<FlightOutcome<V>>>;

/// De-duplicates concurrent invocations of the same keyed work.
pub struct FlightGroup<V> {
    inflight: Arc<DashMap<String, FlightFuture<V>>>,
}

impl<V> Clone for FlightGroup<V> {
    fn clone(&self) -> Self {
        Self {
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<V> Default for FlightGroup<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FlightGroup<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty flight group.
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// Run `work` at most once concurrently per `key`.
    ///
    /// If a call for `key` is already in flight, `work` is not invoked and
    /// this caller awaits the in-flight outcome. The registration is cleared
    /// when the call completes, so the next request after completion starts
    /// a fresh call. Late arrivers that attach to a just-completed entry
    /// still observe the published outcome (the shared future caches it).
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let shared = match self.inflight.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let (tx, rx) = oneshot::channel::<FlightOutcome<V>>();
                let shared = rx.shared();
                entry.insert(shared.clone());

                let inflight = Arc::clone(&self.inflight);
                let key = key.to_string();
                let fut = work();
                tokio::spawn(async move {
                    let outcome = fut.await.map_err(|e| e.to_string());
                    inflight.remove(&key);
                    let _ = tx.send(outcome);
                });
                shared
            }
        };

        match shared.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(Error::upstream(message)),
            Err(_canceled) => Err(Error::internal("in-flight call dropped without a result")),
        }
    }

    /// Number of calls currently in flight.
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    /// Whether no call is in flight.
    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}
