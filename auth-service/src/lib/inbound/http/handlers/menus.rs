use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::UserRole;

/// Greeting endpoint for administrators.
///
/// The authenticator middleware never rejects; the role check lives here,
/// where the absent principal becomes a 401 and the wrong role a 403.
pub async fn admin_menu(
    principal: Option<Extension<AuthenticatedUser>>,
) -> Result<ApiSuccess<MenuResponseData>, ApiError> {
    let user = require_principal(principal)?;

    if user.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "Access denied: you do not have the required role".to_string(),
        ));
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MenuResponseData {
            message: format!("Welcome administrator {}", user.username),
        },
    ))
}

/// Greeting endpoint for any authenticated user.
pub async fn user_menu(
    principal: Option<Extension<AuthenticatedUser>>,
) -> Result<ApiSuccess<MenuResponseData>, ApiError> {
    let user = require_principal(principal)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MenuResponseData {
            message: format!("Welcome user {}", user.username),
        },
    ))
}

fn require_principal(
    principal: Option<Extension<AuthenticatedUser>>,
) -> Result<AuthenticatedUser, ApiError> {
    principal
        .map(|Extension(user)| user)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuResponseData {
    pub message: String,
}
