//! Tenant-wide analytics handlers

use axum::{extract::State, Json};
use chrono::Utc;

use crate::AppState;
use stmindex_analytics::AdvancedAnalytics;
use stmindex_common::{auth::AuthContext, errors::Result};

/// Tenant-wide advanced analytics.
///
/// Citation figures are simulated per request and are not reproducible;
/// the response documents them as estimates.
pub async fn advanced(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AdvancedAnalytics>> {
    let papers = state.repo.list_papers_by_pub_date(auth.tenant_id).await?;
    let journals = state.repo.list_journals(auth.tenant_id).await?;

    let configs = state
        .repo
        .list_database_configs(auth.tenant_id, false)
        .await?;
    let mut coverage = Vec::with_capacity(configs.len());
    for config in configs {
        let accepted = state
            .repo
            .accepted_applications_for_config(config.id)
            .await?;
        coverage.push((config, accepted));
    }

    let analytics = stmindex_analytics::advanced_analytics(
        &papers,
        &journals,
        &coverage,
        Utc::now(),
        &mut rand::thread_rng(),
    );

    tracing::info!(
        tenant_id = %auth.tenant_id,
        papers = analytics.overview.total_papers,
        "Advanced analytics computed"
    );

    Ok(Json(analytics))
}
