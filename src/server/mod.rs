//! HTTP transport layer
//!
//! Thin Rocket assembly around the resolution service: routes, request
//! guards (rate limiting, API-key auth, client identity) and JSON catchers.

pub mod auth;
pub mod guards;
pub mod handlers;
pub mod identity;

use crate::config::AppConfig;
use crate::infrastructure::rate_limit::IpRateLimiter;
use crate::services::balance::BalanceService;
use rocket::config::Config as RocketConfig;
use rocket::{catchers, routes, Build, Rocket};
use std::net::IpAddr;

/// Build the Rocket configuration from application settings.
fn rocket_config(config: &AppConfig) -> RocketConfig {
    let address: IpAddr = config
        .server
        .address
        .parse()
        .unwrap_or_else(|_| IpAddr::from([0, 0, 0, 0]));
    RocketConfig {
        address,
        port: config.server.port,
        ..RocketConfig::default()
    }
}

/// Assemble the server with its managed state, routes and catchers.
pub fn build_rocket(
    config: &AppConfig,
    service: BalanceService,
    limiter: IpRateLimiter,
) -> Rocket<Build> {
    rocket::custom(rocket_config(config))
        .manage(service)
        .manage(limiter)
        .manage(config.auth.clone())
        .mount("/", routes![handlers::resolve_balances, handlers::health])
        .register(
            "/",
            catchers![
                handlers::unauthorized,
                handlers::not_found,
                handlers::unprocessable,
                handlers::bad_request,
                handlers::rate_limited,
            ],
        )
}
