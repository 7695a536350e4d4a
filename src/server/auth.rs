//! API-key authentication guard
//!
//! Checks the configured header against the configured key set. The
//! credential store behind the keys is a deployment concern; swapping in a
//! database-backed store only touches this module.

use crate::config::AuthConfig;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use tracing::warn;

/// Why an API key was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No key header was presented
    Missing,
    /// The presented key is not in the configured set
    Invalid,
}

/// Request guard enforcing API-key authentication when enabled.
pub struct ApiKeyGuard;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKeyGuard {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<AuthConfig>() else {
            warn!("auth config not managed; refusing request");
            return Outcome::Error((Status::Unauthorized, AuthError::Missing));
        };
        if !config.enabled {
            return Outcome::Success(ApiKeyGuard);
        }

        match req.headers().get_one(&config.header).map(str::trim) {
            None | Some("") => Outcome::Error((Status::Unauthorized, AuthError::Missing)),
            Some(key) if config.validate_key(key) => Outcome::Success(ApiKeyGuard),
            Some(_) => Outcome::Error((Status::Unauthorized, AuthError::Invalid)),
        }
    }
}
