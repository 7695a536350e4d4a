//! Application services

pub mod balance;
