//! Reviewer pool management handlers (admin)

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
    db::models::{Reviewer, UserRole},
    db::repository::{NewReviewer, ReviewerUpdate},
    errors::{AppError, Result},
};

/// Roles allowed to manage the reviewer pool
const MANAGER_ROLES: &[UserRole] = &[UserRole::JournalManager];

/// Request to add a reviewer to the pool
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewerRequest {
    #[validate(length(min = 1, max = 200))]
    pub first_name: String,

    #[validate(length(min = 1, max = 200))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    pub institution: Option<String>,

    /// Comma-separated expertise keywords
    #[validate(length(min = 1))]
    pub expertise: String,

    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub rating: f64,
}

/// Partial reviewer update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewerRequest {
    #[validate(length(min = 1, max = 200))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub last_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    /// Double option: outer absent leaves as is, inner null clears
    #[serde(default, with = "double_option")]
    pub institution: Option<Option<String>>,

    #[validate(length(min = 1))]
    pub expertise: Option<String>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

/// List the tenant's reviewer pool
pub async fn list_reviewers(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<Reviewer>>> {
    auth.require_role(MANAGER_ROLES)?;

    let reviewers = state.repo.list_reviewers(auth.tenant_id).await?;
    Ok(Json(reviewers))
}

/// Add a reviewer to the pool
pub async fn create_reviewer(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateReviewerRequest>,
) -> Result<(StatusCode, Json<Reviewer>)> {
    auth.require_role(MANAGER_ROLES)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let reviewer = state
        .repo
        .create_reviewer(
            auth.tenant_id,
            NewReviewer {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                institution: request.institution,
                expertise: request.expertise,
                rating: request.rating,
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "CREATE_REVIEWER",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!(
                "Added reviewer: {} {}",
                reviewer.first_name, reviewer.last_name
            )),
        )
        .await;

    Ok((StatusCode::CREATED, Json(reviewer)))
}

/// Update a reviewer
pub async fn update_reviewer(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(reviewer_id): Path<Uuid>,
    Json(request): Json<UpdateReviewerRequest>,
) -> Result<Json<Reviewer>> {
    auth.require_role(MANAGER_ROLES)?;
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let existing = find_tenant_reviewer(&state, &auth, reviewer_id).await?;

    let updated = state
        .repo
        .update_reviewer(
            existing.id,
            ReviewerUpdate {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                institution: request.institution,
                expertise: request.expertise,
                rating: request.rating,
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "UPDATE_REVIEWER",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Updated reviewer {}", updated.id)),
        )
        .await;

    Ok(Json(updated))
}

/// Remove a reviewer from the pool
pub async fn delete_reviewer(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(reviewer_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth.require_role(MANAGER_ROLES)?;

    let existing = find_tenant_reviewer(&state, &auth, reviewer_id).await?;
    state.repo.delete_reviewer(existing.id).await?;

    state
        .repo
        .record_action(
            "DELETE_REVIEWER",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Removed reviewer {}", existing.id)),
        )
        .await;

    tracing::info!(
        reviewer_id = %existing.id,
        tenant_id = %auth.tenant_id,
        "Reviewer deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a reviewer and reject cross-tenant access
async fn find_tenant_reviewer(
    state: &AppState,
    auth: &AuthContext,
    reviewer_id: Uuid,
) -> Result<Reviewer> {
    let reviewer = state
        .repo
        .find_reviewer_by_id(reviewer_id)
        .await?
        .ok_or_else(|| AppError::ReviewerNotFound {
            id: reviewer_id.to_string(),
        })?;

    auth.require_tenant(reviewer.tenant_id)?;
    Ok(reviewer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_bounds_rating() {
        let request: CreateReviewerRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Alice",
            "lastName": "Chen",
            "email": "alice.chen@university.edu",
            "expertise": "Machine Learning, Neural Networks",
            "rating": 4.5
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let bad: CreateReviewerRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Alice",
            "lastName": "Chen",
            "email": "alice.chen@university.edu",
            "expertise": "ML",
            "rating": 7.0
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_request_distinguishes_absent_from_null() {
        let absent: UpdateReviewerRequest =
            serde_json::from_value(serde_json::json!({ "rating": 3.0 })).unwrap();
        assert!(absent.institution.is_none());

        let cleared: UpdateReviewerRequest =
            serde_json::from_value(serde_json::json!({ "institution": null })).unwrap();
        assert_eq!(cleared.institution, Some(None));

        let set: UpdateReviewerRequest =
            serde_json::from_value(serde_json::json!({ "institution": "MIT" })).unwrap();
        assert_eq!(set.institution, Some(Some("MIT".to_string())));
    }
}
