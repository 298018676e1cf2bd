//! Authentication handlers

use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use stmindex_common::errors::{AppError, Result};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response with the issued token and user profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub tenant_id: Uuid,
}

/// Authenticate a user and issue a JWT
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let user = state
        .repo
        .find_user_by_email(&request.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Equality comparison against stored credentials; see the user entity
    // for the storage caveat
    if user.password != request.password {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt
        .generate_token(user.id, &user.email, user.role, user.tenant_id)?;

    state
        .repo
        .record_action("LOGIN", Some(user.id), user.tenant_id, None)
        .await;

    tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role.as_str().to_string(),
            tenant_id: user.tenant_id,
        },
    }))
}
