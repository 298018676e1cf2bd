//! Journal management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::AppState;
use stmindex_common::{
    auth::AuthContext,
    db::models::{
        ApplicationStatus, DatabaseApplication, DatabaseConfig, Journal, JournalStatus,
    },
    db::repository::NewJournal,
    errors::{AppError, Result},
    notify::emit_application_updated,
    wpsync::SyncReport,
};
use stmindex_analytics::JournalStats;

/// ISSN format: four digits, hyphen, three digits, check digit (0-9 or X)
fn validate_issn(issn: &str) -> std::result::Result<(), ValidationError> {
    static ISSN_RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    let re = ISSN_RE.get_or_init(|| regex_lite::Regex::new(r"^\d{4}-\d{3}[\dX]$").unwrap());

    if re.is_match(issn) {
        Ok(())
    } else {
        Err(ValidationError::new("issn"))
    }
}

/// Request to create a new journal
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalRequest {
    #[validate(length(min = 1, max = 500))]
    pub name: String,

    #[validate(length(min = 1, max = 20))]
    pub code: String,

    #[validate(custom(function = validate_issn))]
    pub issn: String,

    #[serde(default = "default_status")]
    pub status: JournalStatus,

    #[validate(url)]
    pub wordpress_url: Option<String>,
}

fn default_status() -> JournalStatus {
    JournalStatus::Active
}

/// Request to apply for indexing in an external database
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub database_config_id: Uuid,

    #[serde(default = "default_application_status")]
    pub status: ApplicationStatus,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

fn default_application_status() -> ApplicationStatus {
    ApplicationStatus::Pending
}

/// An application joined with its target database
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: DatabaseApplication,
    pub database: Option<DatabaseConfig>,
}

/// A journal with its papers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDetail {
    #[serde(flatten)]
    pub journal: Journal,
    pub papers: Vec<stmindex_common::db::models::Paper>,
}

/// List the tenant's journals, most recently updated first
pub async fn list_journals(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<Journal>>> {
    let journals = state.repo.list_journals(auth.tenant_id).await?;
    Ok(Json(journals))
}

/// Create a new journal
pub async fn create_journal(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<Journal>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let journal = state
        .repo
        .create_journal(
            auth.tenant_id,
            NewJournal {
                name: request.name,
                code: request.code,
                issn: request.issn,
                status: request.status,
                wordpress_url: request.wordpress_url,
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "CREATE_JOURNAL",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Created journal: {}", journal.name)),
        )
        .await;

    tracing::info!(
        journal_id = %journal.id,
        tenant_id = %auth.tenant_id,
        "Journal created"
    );

    Ok((StatusCode::CREATED, Json(journal)))
}

/// Get a journal by ID, with its papers
pub async fn get_journal(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<JournalDetail>> {
    let journal = find_tenant_journal(&state, &auth, journal_id).await?;
    let papers = state.repo.papers_for_journal(journal.id).await?;

    Ok(Json(JournalDetail { journal, papers }))
}

/// Indexing statistics for a journal
pub async fn journal_stats(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<JournalStats>> {
    let journal = find_tenant_journal(&state, &auth, journal_id).await?;

    let papers = state.repo.papers_for_journal(journal.id).await?;
    let applications: Vec<(DatabaseApplication, DatabaseConfig)> = state
        .repo
        .applications_for_journal(journal.id)
        .await?
        .into_iter()
        .filter_map(|(app, config)| config.map(|c| (app, c)))
        .collect();

    Ok(Json(stmindex_analytics::journal_stats(
        &papers,
        &applications,
    )))
}

/// Pull recent papers from the journal's WordPress site
pub async fn sync_journal(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<SyncReport>> {
    let journal = find_tenant_journal(&state, &auth, journal_id).await?;

    let report = state.wpsync.sync_journal(&state.repo, &journal).await?;

    state
        .repo
        .record_action(
            "WP_SYNC",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!(
                "Synced {} papers for journal: {}",
                report.papers_synced, journal.name
            )),
        )
        .await;

    Ok(Json(report))
}

/// List a journal's database applications
pub async fn list_applications(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>> {
    let journal = find_tenant_journal(&state, &auth, journal_id).await?;

    let applications = state
        .repo
        .applications_for_journal(journal.id)
        .await?
        .into_iter()
        .map(|(application, database)| ApplicationView {
            application,
            database,
        })
        .collect();

    Ok(Json(applications))
}

/// Create or update an application for a (journal, database) pair
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(journal_id): Path<Uuid>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<DatabaseApplication>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let journal = find_tenant_journal(&state, &auth, journal_id).await?;

    let config = state
        .repo
        .find_database_config_by_id(request.database_config_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "DatabaseConfig".to_string(),
            id: request.database_config_id.to_string(),
        })?;
    auth.require_tenant(config.tenant_id)?;

    let application = state
        .repo
        .upsert_application(
            auth.tenant_id,
            journal.id,
            config.id,
            request.status,
            request.notes,
        )
        .await?;

    emit_application_updated(
        state.notifier.as_ref(),
        auth.tenant_id,
        &journal.name,
        &config.name,
        application.status.as_str(),
    )
    .await;

    state
        .repo
        .record_action(
            "DB_APPLY",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("{} applied to {}", journal.name, config.name)),
        )
        .await;

    Ok(Json(application))
}

/// Resolve a journal and reject cross-tenant access
async fn find_tenant_journal(
    state: &AppState,
    auth: &AuthContext,
    journal_id: Uuid,
) -> Result<Journal> {
    let journal = state
        .repo
        .find_journal_by_id(journal_id)
        .await?
        .ok_or_else(|| AppError::JournalNotFound {
            id: journal_id.to_string(),
        })?;

    auth.require_tenant(journal.tenant_id)?;
    Ok(journal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issn_format() {
        assert!(validate_issn("2456-1234").is_ok());
        assert!(validate_issn("0028-083X").is_ok());
        assert!(validate_issn("123-4567").is_err());
        assert!(validate_issn("12345678").is_err());
        assert!(validate_issn("2456-12XX").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateJournalRequest = serde_json::from_value(serde_json::json!({
            "name": "International Journal of STM Research",
            "code": "IJSR",
            "issn": "2456-1234"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.status, JournalStatus::Active);

        let bad: CreateJournalRequest = serde_json::from_value(serde_json::json!({
            "name": "J",
            "code": "J",
            "issn": "nope"
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }
}
