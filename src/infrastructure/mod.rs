//! Cross-cutting technical concerns: caching, request coalescing,
//! rate limiting, logging and background-task lifecycle.

pub mod cache;
pub mod logging;
pub mod rate_limit;
pub mod shutdown;
pub mod singleflight;
