//! Audit log handlers

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use stmindex_common::{
    auth::AuthContext,
    db::models::UserRole,
    errors::Result,
};

/// Roles allowed to read the audit trail
const AUDIT_ROLES: &[UserRole] = &[UserRole::Auditor];

/// An audit entry with its acting user resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    pub id: Uuid,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuditUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// List the tenant's audit trail, newest first
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<AuditLogView>>> {
    auth.require_role(AUDIT_ROLES)?;

    let entries = state
        .repo
        .list_audit_logs(auth.tenant_id)
        .await?
        .into_iter()
        .map(|(entry, user)| AuditLogView {
            id: entry.id,
            action: entry.action,
            details: entry.details,
            timestamp: entry.timestamp.to_rfc3339(),
            user: user.map(|u| AuditUser {
                id: u.id,
                email: u.email,
                display_name: u.display_name,
            }),
        })
        .collect();

    Ok(Json(entries))
}
