//! Reviewer invitation handlers (admin)

use axum::{extract::State, Json};
use validator::Validate;

use crate::AppState;
use stmindex_common::{
    auth::AuthContext,
    db::models::UserRole,
    errors::{AppError, Result},
    mail::{BulkSendReport, ReviewerInvitation, SendReport},
    notify::emit_reviewer_invited,
};

const MANAGER_ROLES: &[UserRole] = &[UserRole::JournalManager, UserRole::Editor];

/// Send a single peer-review invitation
pub async fn send_invitation(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(invitation): Json<ReviewerInvitation>,
) -> Result<Json<SendReport>> {
    auth.require_role(MANAGER_ROLES)?;
    invitation.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let report = state.mailer.send_invitation(&invitation).await?;

    emit_reviewer_invited(
        state.notifier.as_ref(),
        auth.tenant_id,
        &invitation.reviewer_email,
        &invitation.paper_title,
    )
    .await;

    state
        .repo
        .record_action(
            "SEND_INVITATION",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!(
                "Invited {} to review \"{}\"",
                invitation.reviewer_email, invitation.paper_title
            )),
        )
        .await;

    Ok(Json(report))
}

/// Send a batch of invitations; individual failures don't abort the batch
pub async fn send_bulk_invitations(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(invitations): Json<Vec<ReviewerInvitation>>,
) -> Result<Json<BulkSendReport>> {
    auth.require_role(MANAGER_ROLES)?;
    for invitation in &invitations {
        invitation.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: None,
        })?;
    }

    let report = state.mailer.send_bulk(&invitations).await;

    state
        .repo
        .record_action(
            "SEND_BULK_INVITATIONS",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!(
                "Sent {} of {} invitations",
                report.successful, report.total
            )),
        )
        .await;

    Ok(Json(report))
}
