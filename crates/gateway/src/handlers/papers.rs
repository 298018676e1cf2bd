//! Paper management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use stmindex_common::{
    auth::AuthContext,
    db::models::{Journal, Paper},
    db::repository::NewPaper,
    errors::{AppError, Result},
    metrics,
    scholar::VerificationOutcome,
};
use stmindex_analytics::Recommendation;

/// Request to register a new paper
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaperRequest {
    #[validate(length(min = 1, max = 1000))]
    pub title: String,

    #[validate(length(min = 1))]
    pub authors: Vec<String>,

    #[validate(length(min = 1, max = 255))]
    pub doi: String,

    pub journal_id: Uuid,

    pub pub_date: Option<DateTime<Utc>>,
}

/// A paper in API responses: authors as an array, plus the per-service
/// indexing block clients render
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperView {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub doi: String,
    pub journal_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<JournalSummary>,
    pub pub_date: String,
    pub indexing: IndexingView,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSummary {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingView {
    pub scholar: ScholarIndexing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarIndexing {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Reviewer recommendations for a paper
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub paper_id: Uuid,
    pub recommendations: Vec<Recommendation>,
}

impl PaperView {
    fn from_paper(paper: Paper, journal: Option<Journal>) -> Self {
        Self {
            id: paper.id,
            title: paper.title,
            authors: split_authors(&paper.authors),
            doi: paper.doi,
            journal_id: paper.journal_id,
            journal: journal.map(|j| JournalSummary {
                id: j.id,
                name: j.name,
                code: j.code,
            }),
            pub_date: paper.pub_date.to_rfc3339(),
            indexing: IndexingView {
                scholar: ScholarIndexing {
                    status: paper.indexing_status.as_str().to_string(),
                    url: paper.scholar_url,
                },
            },
            created_at: paper.created_at.to_rfc3339(),
            updated_at: paper.updated_at.to_rfc3339(),
        }
    }
}

/// Authors are stored comma-joined; split and drop empty segments
fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

/// List the tenant's papers with their journals, newest first
pub async fn list_papers(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<PaperView>>> {
    let papers = state
        .repo
        .list_papers(auth.tenant_id)
        .await?
        .into_iter()
        .map(|(paper, journal)| PaperView::from_paper(paper, journal))
        .collect();

    Ok(Json(papers))
}

/// Register a new paper
pub async fn create_paper(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreatePaperRequest>,
) -> Result<(StatusCode, Json<PaperView>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let journal = state
        .repo
        .find_journal_by_id(request.journal_id)
        .await?
        .ok_or_else(|| AppError::JournalNotFound {
            id: request.journal_id.to_string(),
        })?;
    auth.require_tenant(journal.tenant_id)?;

    if state.repo.find_paper_by_doi(&request.doi).await?.is_some() {
        return Err(AppError::DuplicateDoi { doi: request.doi });
    }

    let paper = state
        .repo
        .create_paper(
            auth.tenant_id,
            NewPaper {
                title: request.title,
                authors: request.authors.join(","),
                doi: request.doi,
                journal_id: journal.id,
                pub_date: request.pub_date.unwrap_or_else(Utc::now),
            },
        )
        .await?;

    state
        .repo
        .record_action(
            "CREATE_PAPER",
            Some(auth.user_id),
            auth.tenant_id,
            Some(format!("Registered paper with DOI {}", paper.doi)),
        )
        .await;

    tracing::info!(
        paper_id = %paper.id,
        tenant_id = %auth.tenant_id,
        doi = %paper.doi,
        "Paper created"
    );

    Ok((
        StatusCode::CREATED,
        Json(PaperView::from_paper(paper, Some(journal))),
    ))
}

/// Get a paper by ID
pub async fn get_paper(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<PaperView>> {
    let paper = find_tenant_paper(&state, &auth, paper_id).await?;
    let journal = state.repo.find_journal_by_id(paper.journal_id).await?;

    Ok(Json(PaperView::from_paper(paper, journal)))
}

/// Rank the tenant's reviewer pool against a paper
pub async fn recommend_reviewers(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<RecommendResponse>> {
    let paper = find_tenant_paper(&state, &auth, paper_id).await?;
    let reviewers = state.repo.list_reviewers(auth.tenant_id).await?;

    let recommendations = stmindex_analytics::recommend(&paper, &reviewers);
    metrics::record_recommendation(recommendations.len());

    tracing::info!(
        paper_id = %paper.id,
        pool_size = reviewers.len(),
        matches = recommendations.len(),
        "Reviewer recommendation computed"
    );

    Ok(Json(RecommendResponse {
        paper_id: paper.id,
        recommendations,
    }))
}

/// Run a Scholar verification for a paper and persist the outcome
pub async fn verify_paper(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<VerificationOutcome>> {
    let paper = find_tenant_paper(&state, &auth, paper_id).await?;

    let outcome = state
        .scholar
        .verify(&state.repo, state.notifier.as_ref(), paper)
        .await?;

    Ok(Json(outcome))
}

/// Resolve a paper and reject cross-tenant access
async fn find_tenant_paper(
    state: &AppState,
    auth: &AuthContext,
    paper_id: Uuid,
) -> Result<Paper> {
    let paper = state
        .repo
        .find_paper_by_id(paper_id)
        .await?
        .ok_or_else(|| AppError::PaperNotFound {
            id: paper_id.to_string(),
        })?;

    auth.require_tenant(paper.tenant_id)?;
    Ok(paper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_authors() {
        assert_eq!(
            split_authors("John Doe,Jane Smith"),
            vec!["John Doe", "Jane Smith"]
        );
        assert_eq!(split_authors("Solo Author"), vec!["Solo Author"]);
        assert_eq!(split_authors(" A , , B "), vec!["A", "B"]);
        assert!(split_authors("").is_empty());
    }

    #[test]
    fn test_create_request_requires_authors() {
        let request: CreatePaperRequest = serde_json::from_value(serde_json::json!({
            "title": "Machine Learning in Academic Indexing",
            "authors": [],
            "doi": "10.1234/ijsr.2023.001",
            "journalId": Uuid::new_v4()
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }
}
