//! Solana JSON-RPC balance fetcher
//!
//! Calls `getBalance` with finalized commitment and converts the returned
//! lamports to a fixed-point SOL string. The conversion is pure integer
//! arithmetic; no binary floats touch the amount.

use crate::config::RpcConfig;
use crate::domain::error::{Error, Result};
use crate::domain::ports::BalanceFetcher;
use crate::domain::types::BalanceResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcBalance>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcBalance {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// JSON-RPC client for a Solana node
pub struct SolanaRpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SolanaRpcClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl BalanceFetcher for SolanaRpcClient {
    async fn fetch(&self, address: &str) -> Result<BalanceResult> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address, { "commitment": "finalized" }],
        });

        let response: RpcResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(Error::upstream(format!(
                "rpc error {} for {address}: {}",
                err.code, err.message
            )));
        }
        let lamports = response
            .result
            .ok_or_else(|| Error::upstream(format!("rpc response for {address} missing result")))?
            .value;
        debug!(address, lamports, "fetched balance");

        Ok(BalanceResult {
            wallet_address: address.to_string(),
            balance: lamports_to_sol(lamports),
        })
    }
}

/// Render a lamport amount as a SOL decimal string with nine fractional
/// digits (the exact lamport resolution).
pub fn lamports_to_sol(lamports: u64) -> String {
    format!(
        "{}.{:09}",
        lamports / LAMPORTS_PER_SOL,
        lamports % LAMPORTS_PER_SOL
    )
}
