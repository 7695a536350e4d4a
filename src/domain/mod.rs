//! Core domain types, ports and error handling

pub mod error;
pub mod ports;
pub mod types;
