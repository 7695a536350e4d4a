//! Rate-limiting request guard
//!
//! Gates requests before they reach the resolution service. Admission
//! denial touches neither the cache nor the coalescer; the caller gets a
//! 429 with retry guidance from the catcher in `handlers`.

use crate::infrastructure::rate_limit::IpRateLimiter;
use crate::server::identity::ClientIdentity;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use tracing::{debug, error};

/// Request guard that consumes one rate-limit token for the client.
pub struct RateLimited;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RateLimited {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(limiter) = req.rocket().state::<IpRateLimiter>() else {
            // not configured; allow rather than block legitimate users
            error!("rate limiter not managed; admitting request");
            return Outcome::Success(RateLimited);
        };

        let ClientIdentity(identity) = match req.guard::<ClientIdentity>().await {
            Outcome::Success(identity) => identity,
            // infallible guard
            _ => ClientIdentity(None),
        };

        if limiter.allow(identity.as_deref()) {
            Outcome::Success(RateLimited)
        } else {
            debug!(client = identity.as_deref().unwrap_or("-"), "rate limit exceeded");
            Outcome::Error((Status::TooManyRequests, ()))
        }
    }
}
