use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::RoleError;
use crate::domain::auth::errors::UsernameError;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserRole;
use crate::domain::auth::models::Username;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;
use crate::inbound::http::router::AppState;

pub async fn register<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    username: String,
    password: String,
    role: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid role: {0}")]
    Role(#[from] RoleError),
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        let role = UserRole::parse(&self.role)?;
        Ok(RegisterUserCommand::new(username, self.password, role))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for RegisterResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}
