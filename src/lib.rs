//! Solana wallet balance resolution service
//!
//! Resolves batches of wallet addresses into freshness-bounded SOL balances
//! by querying a Solana JSON-RPC node, while shielding that upstream from
//! redundant concurrent work (request coalescing, TTL caching) and bursty
//! client traffic (per-client token-bucket rate limiting).

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod providers;
pub mod server;
pub mod services;
