//! Port traits implemented by provider adapters

use crate::domain::error::Result;
use crate::domain::types::BalanceResult;
use async_trait::async_trait;

/// Upstream fetch collaborator.
///
/// Assumed slow (network-bound) and independently fallible. The resolution
/// service treats its errors as opaque and does not retry at this layer;
/// retry policy, if any, belongs to the implementation behind this trait.
#[async_trait]
pub trait BalanceFetcher: Send + Sync {
    /// Fetch the current balance for a single wallet address.
    async fn fetch(&self, address: &str) -> Result<BalanceResult>;
}
