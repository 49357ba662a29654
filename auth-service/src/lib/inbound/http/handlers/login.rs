use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;
use crate::inbound::http::middleware::derive_client_key;
use crate::inbound::http::router::AppState;

/// Authenticate a user and hand back a bearer token.
///
/// The client key derived here is the one the gate checks and the one the
/// attempt hooks record against.
pub async fn login<R: UserRepository>(
    State(state): State<AppState<R>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let client_key = derive_client_key(&headers, remote);

    let token = state
        .auth_service
        .login(&client_key, &body.username, &body.password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(StatusCode::OK, LoginResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}
