//! Client identity derivation
//!
//! Resolves the identity the rate limiter keys on, in priority order:
//! first entry of `X-Forwarded-For`, then `X-Real-IP`, then the transport
//! peer address. A request with no derivable identity yields `None` and is
//! never rate limited — it is ambiguous who to penalize.

use rocket::request::{self, FromRequest, Request};
use std::net::IpAddr;

/// Derive a client identity from the available request evidence.
pub fn derive_client_identity(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    peer: Option<IpAddr>,
) -> Option<String> {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    if let Some(real) = real_ip {
        let real = real.trim();
        if !real.is_empty() {
            return Some(real.to_string());
        }
    }
    peer.map(|ip| ip.to_string())
}

/// Request guard wrapping the derived identity. Never fails.
pub struct ClientIdentity(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIdentity {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let forwarded_for = req.headers().get_one("x-forwarded-for");
        let real_ip = req.headers().get_one("x-real-ip");
        let peer = req.remote().map(|addr| addr.ip());
        request::Outcome::Success(ClientIdentity(derive_client_identity(
            forwarded_for,
            real_ip,
            peer,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_takes_priority() {
        let peer = Some("10.0.0.9".parse().unwrap());
        let identity =
            derive_client_identity(Some("203.0.113.7, 10.0.0.2"), Some("198.51.100.1"), peer);
        assert_eq!(identity.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn real_ip_is_second_choice() {
        let peer = Some("10.0.0.9".parse().unwrap());
        let identity = derive_client_identity(None, Some(" 198.51.100.1 "), peer);
        assert_eq!(identity.as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn blank_headers_fall_through_to_peer() {
        let peer = Some("10.0.0.9".parse().unwrap());
        let identity = derive_client_identity(Some("  "), Some(""), peer);
        assert_eq!(identity.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn no_evidence_means_no_identity() {
        assert_eq!(derive_client_identity(None, None, None), None);
    }
}
