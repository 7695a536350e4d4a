//! HTTP route handlers and error catchers

use crate::domain::types::{BalanceRequest, BalanceResponse};
use crate::infrastructure::rate_limit::IpRateLimiter;
use crate::server::auth::ApiKeyGuard;
use crate::server::guards::RateLimited;
use crate::services::balance::BalanceService;
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{catch, get, post, Request, Responder, State};
use serde::Serialize;
use tracing::warn;

/// JSON error body shared by the catchers
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error identifier
    pub error: &'static str,
    /// Human-readable message
    pub message: String,
}

/// 429 response carrying a Retry-After header
#[derive(Responder)]
#[response(status = 429, content_type = "json")]
pub struct RateLimitedResponse {
    body: Json<ErrorBody>,
    retry_after: Header<'static>,
}

/// Resolve a batch of wallet balances.
///
/// Always answers 200 with the partial-success shape: resolved balances in
/// `results`, per-address failures in `errors`.
#[post("/api/balances", format = "json", data = "<request>")]
pub async fn resolve_balances(
    _admitted: RateLimited,
    _key: ApiKeyGuard,
    request: Json<BalanceRequest>,
    service: &State<BalanceService>,
) -> Json<BalanceResponse> {
    let (results, errors) = service.resolve_many(&request.wallets).await;
    for (address, err) in &errors {
        warn!(address, error = %err, "balance resolution failed");
    }
    Json(BalanceResponse {
        results,
        errors: errors
            .into_iter()
            .map(|(address, err)| (address, err.to_string()))
            .collect(),
    })
}

/// Liveness probe
#[get("/health")]
pub fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[catch(401)]
pub fn unauthorized() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "unauthorized",
        message: "missing or invalid API key".to_string(),
    })
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "not_found",
        message: "no such route".to_string(),
    })
}

#[catch(422)]
pub fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "bad_request",
        message: "request body is not a valid balance request".to_string(),
    })
}

#[catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "bad_request",
        message: "malformed request".to_string(),
    })
}

#[catch(429)]
pub fn rate_limited(req: &Request<'_>) -> RateLimitedResponse {
    let retry_after = req
        .rocket()
        .state::<IpRateLimiter>()
        .map_or(60, IpRateLimiter::retry_after_secs);
    RateLimitedResponse {
        body: Json(ErrorBody {
            error: "rate_limited",
            message: format!("rate limit exceeded; retry in {retry_after} seconds"),
        }),
        retry_after: Header::new("Retry-After", retry_after.to_string()),
    }
}
