//! Indexing database handlers
//!
//! `/api/databases` is the tenant-facing list of enabled targets; the
//! `/api/admin/database-configs` routes manage the full set.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use stmindex_common::{
    auth::AuthContext,
    db::models::{DatabaseConfig, UserRole},
    db::repository::{DatabaseConfigUpdate, NewDatabaseConfig},
    errors::{AppError, Result},
};

const MANAGER_ROLES: &[UserRole] = &[UserRole::JournalManager];

/// Request to register an indexing database
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_check_frequency")]
    pub check_frequency: String,
}

fn default_enabled() -> bool {
    true
}

fn default_check_frequency() -> String {
    "WEEKLY".to_string()
}

/// Partial config update
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatabaseConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    pub enabled: Option<bool>,

    pub check_frequency: Option<String>,
}

/// List enabled indexing databases for the tenant
pub async fn list_databases(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<DatabaseConfig>>> {
    let configs = state.repo.list_database_configs(auth.tenant_id, true).await?;
    Ok(Json(configs))
}

/// List all database configs, including disabled ones
pub async fn list_database_configs(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<DatabaseConfig>>> {
    auth.require_role(MANAGER_ROLES)?;

    let configs = state
        .repo
        .list_database_configs(auth.tenant_id, false)
        .await?;
    Ok(Json(configs))
}

/// Register a new indexing database
pub async fn create_database_config(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateDatabaseConfigRequest>,
) -> Result<(StatusCode, Json<DatabaseConfig>)> {
    auth.require_role(MANAGER_ROLES)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let config = state
        .repo
        .create_database_config(
            auth.tenant_id,
            NewDatabaseConfig {
                name: request.name,
                enabled: request.enabled,
                check_frequency: request.check_frequency,
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "CREATE_DATABASE_CONFIG",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Registered indexing database: {}", config.name)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(config)))
}

/// Update an indexing database config
pub async fn update_database_config(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(config_id): Path<Uuid>,
    Json(request): Json<UpdateDatabaseConfigRequest>,
) -> Result<Json<DatabaseConfig>> {
    auth.require_role(MANAGER_ROLES)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let existing = state
        .repo
        .find_database_config_by_id(config_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "DatabaseConfig".to_string(),
            id: config_id.to_string(),
        })?;
    auth.require_tenant(existing.tenant_id)?;

    let updated = state
        .repo
        .update_database_config(
            existing.id,
            DatabaseConfigUpdate {
                name: request.name,
                enabled: request.enabled,
                check_frequency: request.check_frequency,
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "UPDATE_DATABASE_CONFIG",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Updated indexing database {}", updated.id)),
        )
        .await;

    Ok(Json(updated))
}
