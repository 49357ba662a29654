use std::net::SocketAddr;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::models::ClientKey;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;
use crate::inbound::http::router::AppState;

/// Per-request authenticator.
///
/// Runs once for every inbound request: extracts a bearer token, verifies
/// it, and resolves the subject to a live account. On success the
/// principal lands in the request's extensions for downstream handlers;
/// on any failure (no header, malformed header, bad or expired token,
/// deleted identity) the request simply continues unauthenticated.
/// Rejection, if any, happens later in handlers that require a principal.
pub async fn authenticate<R: UserRepository>(
    State(state): State<AppState<R>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(req.headers()) {
        if let Some(user) = state.auth_service.authenticate_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// An absent or malformed header means an anonymous request, not an error.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Lockout-tracking key for the request origin.
///
/// First entry of `X-Forwarded-For` when present, else the peer address.
/// Every lockout read and write is keyed through this one derivation.
pub fn derive_client_key(headers: &HeaderMap, remote: SocketAddr) -> ClientKey {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|entry| !entry.is_empty());

    match forwarded {
        Some(entry) => ClientKey::new(entry),
        None => ClientKey::new(remote.ip().to_string()),
    }
}
