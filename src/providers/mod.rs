//! Provider adapters for external collaborators

pub mod solana;
