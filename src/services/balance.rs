//! Balance resolution service
//!
//! Composes the expiring cache and the fetch coalescer around a pluggable
//! upstream fetcher. Single-key resolution is double-checked: the cache is
//! consulted before entering the coalescer and again inside the coalesced
//! work, so a caller that arrives just after a back-fill pays neither the
//! coalescer nor the upstream. Only successful fetches are cached; a failed
//! fetch leaves nothing behind, so the next caller retries the upstream.

use crate::domain::error::{Error, Result};
use crate::domain::ports::BalanceFetcher;
use crate::domain::types::BalanceResult;
use crate::infrastructure::cache::ExpiringCache;
use crate::infrastructure::singleflight::FlightGroup;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::error;

/// Cache-backed, concurrency-deduplicating balance resolver.
///
/// Cheap to clone; clones share the cache and in-flight registry.
#[derive(Clone)]
pub struct BalanceService {
    cache: ExpiringCache<BalanceResult>,
    flights: FlightGroup<BalanceResult>,
    fetcher: Arc<dyn BalanceFetcher>,
}

impl BalanceService {
    /// Create a service whose cached balances expire after `ttl`.
    pub fn new(ttl: Duration, fetcher: Arc<dyn BalanceFetcher>) -> Self {
        Self {
            cache: ExpiringCache::new(ttl),
            flights: FlightGroup::new(),
            fetcher,
        }
    }

    /// Resolve a single wallet address.
    ///
    /// Identical addresses requested concurrently coalesce to one upstream
    /// call; the cache key space and the coalescing key space are the same.
    pub async fn get(&self, address: &str) -> Result<BalanceResult> {
        if address.trim().is_empty() {
            return Err(Error::invalid_argument("wallet address is empty"));
        }

        if let Some(hit) = self.cache.get(address) {
            return Ok(hit);
        }

        let cache = self.cache.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let owned = address.to_string();
        self.flights
            .run(address, move || async move {
                // another caller may have back-filled while we were arriving
                if let Some(hit) = cache.get(&owned) {
                    return Ok(hit);
                }
                let result = fetcher.fetch(&owned).await?;
                cache.set(&owned, result.clone());
                Ok(result)
            })
            .await
    }

    /// Resolve a batch of wallet addresses concurrently.
    ///
    /// The input is deduplicated first, so repeated addresses cause neither
    /// duplicate upstream work nor duplicate result entries. Each unique
    /// address resolves independently; one failure never aborts or delays
    /// the others. Successes land in the result list in completion order,
    /// failures in the error map keyed by address.
    pub async fn resolve_many(
        &self,
        addresses: &[String],
    ) -> (Vec<BalanceResult>, HashMap<String, Error>) {
        let unique: HashSet<String> = addresses.iter().cloned().collect();

        let mut tasks = JoinSet::new();
        for address in unique {
            let service = self.clone();
            tasks.spawn(async move {
                let outcome = service.get(&address).await;
                (address, outcome)
            });
        }

        let mut results = Vec::new();
        let mut errors = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(result))) => results.push(result),
                Ok((address, Err(err))) => {
                    errors.insert(address, err);
                }
                // a panicked resolution task is a defect, not a per-address
                // failure; surface it in the log and keep draining siblings
                Err(join_err) => {
                    error!(error = %join_err, "balance resolution task failed to join");
                }
            }
        }
        (results, errors)
    }

    /// Number of balances currently cached.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
