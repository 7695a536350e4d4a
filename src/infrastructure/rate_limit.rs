//! Per-client rate limiting
//!
//! Classic token bucket per client identity: capacity equals the configured
//! per-window limit and tokens refill continuously at `limit / window`, so
//! admission never thunders at window boundaries. Buckets untouched for
//! longer than the idle horizon are evicted by a background sweep, never by
//! request-path code, keeping steady-state memory bounded by the count of
//! recently active clients.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Maximum requests per window (also the burst capacity)
    pub max_requests_per_window: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests_per_window: 10,
            window_secs: 60,
        }
    }
}

/// Per-client credit balance plus the bookkeeping the sweep relies on.
struct ClientBucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

/// Token-bucket rate limiter keyed by client identity.
///
/// Cheap to clone; clones share the same buckets.
#[derive(Clone)]
pub struct IpRateLimiter {
    buckets: Arc<DashMap<String, ClientBucket>>,
    enabled: bool,
    burst: f64,
    refill_per_sec: f64,
    window: Duration,
    idle_horizon: Duration,
}

impl IpRateLimiter {
    /// Create a limiter from configuration.
    ///
    /// The idle horizon is twice the window: a client silent for two full
    /// windows has a full bucket again anyway, so its entry carries no state
    /// worth keeping.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_parameters(
            config.enabled,
            config.max_requests_per_window,
            Duration::from_secs(config.window_secs.max(1)),
        )
    }

    fn with_parameters(enabled: bool, max_requests: u32, window: Duration) -> Self {
        let burst = f64::from(max_requests.max(1));
        Self {
            buckets: Arc::new(DashMap::new()),
            enabled,
            burst,
            refill_per_sec: burst / window.as_secs_f64(),
            window,
            idle_horizon: window * 2,
        }
    }

    /// Atomically attempt to consume one token for `identity`.
    ///
    /// `None` means the caller could not be identified; ambiguity about who
    /// to penalize means the request is admitted unlimited (fail open).
    pub fn allow(&self, identity: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(identity) = identity else {
            return true;
        };

        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| ClientBucket {
                tokens: self.burst,
                last_refill: now,
                last_seen: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.burst);
        bucket.last_refill = now;
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until a denied client can expect one token back.
    pub fn retry_after_secs(&self) -> u64 {
        (1.0 / self.refill_per_sec).ceil() as u64
    }

    /// Remove buckets untouched for longer than the idle horizon.
    ///
    /// `retain` walks the map shard by shard, so concurrent `allow` calls
    /// for clients in other shards are not stalled.
    pub fn sweep_idle(&self) {
        let now = Instant::now();
        let horizon = self.idle_horizon;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) <= horizon);
        // concurrent `allow` calls may insert while we sweep
        let evicted = before.saturating_sub(self.buckets.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.buckets.len(), "evicted idle rate-limit buckets");
        }
    }

    /// Periodic sweep loop; runs until `token` is cancelled.
    ///
    /// The period is half the idle horizon, so an idle entry outlives the
    /// horizon by at most one sweep interval.
    pub async fn run_sweeper(self, token: CancellationToken) {
        let mut tick = tokio::time::interval(self.idle_horizon / 2);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = tick.tick() => self.sweep_idle(),
            }
        }
        debug!("rate-limit sweeper stopped");
    }

    /// Number of client identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Whether rate limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The configured window duration.
    pub fn window(&self) -> Duration {
        self.window
    }
}
