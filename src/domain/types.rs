//! Wire types for the balance API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved balance for a single wallet address.
///
/// The balance is a fixed-point decimal string (SOL with nine fractional
/// digits, the exact lamport resolution), never a binary float, so no
/// precision is lost between the RPC node and the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    /// The wallet address the balance belongs to
    pub wallet_address: String,
    /// Balance in SOL as a fixed-point decimal string
    pub balance: String,
}

/// Inbound batch request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Wallet addresses to resolve; duplicates are collapsed
    pub wallets: Vec<String>,
}

/// Batch response: partial success is the normal shape.
///
/// `results` holds one entry per unique address that resolved; `errors` maps
/// each failed address to a message explaining why. Fewer results than
/// requested addresses is valid whenever some of them failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Successfully resolved balances, in completion order
    pub results: Vec<BalanceResult>,
    /// Per-address failure messages
    pub errors: HashMap<String, String>,
}
