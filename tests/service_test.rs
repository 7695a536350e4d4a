//! Resolution service integration tests: caching, coalescing, batch
//! fan-out and failure isolation, exercised through a scripted fetcher.

use async_trait::async_trait;
use dashmap::DashMap;
use solbalance::domain::error::{Error, Result};
use solbalance::domain::ports::BalanceFetcher;
use solbalance::domain::types::BalanceResult;
use solbalance::services::balance::BalanceService;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher that counts calls per address and fails on demand.
#[derive(Default)]
struct ScriptedFetcher {
    calls: DashMap<String, usize>,
    failing: Mutex<HashSet<String>>,
    delay: Duration,
}

impl ScriptedFetcher {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn fail(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    fn recover(&self, address: &str) {
        self.failing.lock().unwrap().remove(address);
    }

    fn calls_for(&self, address: &str) -> usize {
        self.calls.get(address).map_or(0, |c| *c)
    }
}

#[async_trait]
impl BalanceFetcher for ScriptedFetcher {
    async fn fetch(&self, address: &str) -> Result<BalanceResult> {
        *self.calls.entry(address.to_string()).or_insert(0) += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.lock().unwrap().contains(address) {
            return Err(Error::upstream(format!("no account found: {address}")));
        }
        Ok(BalanceResult {
            wallet_address: address.to_string(),
            balance: "1.000000000".to_string(),
        })
    }
}

fn service_with(fetcher: Arc<ScriptedFetcher>, ttl: Duration) -> BalanceService {
    BalanceService::new(ttl, fetcher)
}

#[tokio::test]
async fn cache_hit_skips_the_upstream() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    let first = service.get("wallet-a").await.unwrap();
    let second = service.get("wallet-a").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fetcher.calls_for("wallet-a"), 1);
    assert_eq!(service.cached_entries(), 1);
}

#[tokio::test]
async fn concurrent_gets_coalesce_to_one_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::with_delay(Duration::from_millis(80)));
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.get("wallet-a").await }));
    }
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.wallet_address, "wallet-a");
    }
    assert_eq!(fetcher.calls_for("wallet-a"), 1);
}

#[tokio::test]
async fn failed_fetches_are_not_cached() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    fetcher.fail("wallet-b");
    assert!(service.get("wallet-b").await.is_err());
    assert_eq!(service.cached_entries(), 0);

    // the upstream recovers; the next call retries instead of replaying a
    // cached failure
    fetcher.recover("wallet-b");
    assert!(service.get("wallet-b").await.is_ok());
    assert_eq!(fetcher.calls_for("wallet-b"), 2);
}

#[tokio::test]
async fn expired_entry_triggers_a_refetch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_millis(50));

    service.get("wallet-a").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    service.get("wallet-a").await.unwrap();
    assert_eq!(fetcher.calls_for("wallet-a"), 2);
}

#[tokio::test]
async fn resolve_many_dedupes_the_input() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    let input = vec![
        "wallet-a".to_string(),
        "wallet-a".to_string(),
        "wallet-b".to_string(),
    ];
    let (results, errors) = service.resolve_many(&input).await;

    assert!(errors.is_empty());
    assert_eq!(results.len(), 2);
    assert_eq!(fetcher.calls_for("wallet-a"), 1);
    assert_eq!(fetcher.calls_for("wallet-b"), 1);

    let addresses: HashSet<_> = results.iter().map(|r| r.wallet_address.as_str()).collect();
    assert_eq!(addresses, HashSet::from(["wallet-a", "wallet-b"]));
}

#[tokio::test]
async fn resolve_many_reports_partial_failure() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    fetcher.fail("wallet-b");
    let input = vec!["wallet-a".to_string(), "wallet-b".to_string()];
    let (results, errors) = service.resolve_many(&input).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].wallet_address, "wallet-a");
    assert_eq!(errors.len(), 1);
    assert!(errors["wallet-b"].to_string().contains("no account found"));
}

#[tokio::test]
async fn empty_address_is_rejected_without_touching_the_upstream() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));

    let err = service.get("  ").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(fetcher.calls_for("  "), 0);

    let input = vec![String::new(), "wallet-a".to_string()];
    let (results, errors) = service.resolve_many(&input).await;
    assert_eq!(results.len(), 1);
    assert!(errors[""].is_validation());
}

#[tokio::test]
async fn batch_entries_resolve_independently() {
    // one slow failure must not delay or poison the sibling addresses
    let fetcher = Arc::new(ScriptedFetcher::with_delay(Duration::from_millis(30)));
    let service = service_with(Arc::clone(&fetcher), Duration::from_secs(60));
    fetcher.fail("wallet-c");

    let input: Vec<String> = ["wallet-a", "wallet-b", "wallet-c", "wallet-d"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let (results, errors) = service.resolve_many(&input).await;

    assert_eq!(results.len(), 3);
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("wallet-c"));
}
