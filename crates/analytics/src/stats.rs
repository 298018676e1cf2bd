//! Per-journal indexing statistics
//!
//! Derived metrics over a journal's papers and database applications.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stmindex_common::db::models::{
    ApplicationStatus, DatabaseApplication, DatabaseConfig, IndexingStatus, Paper,
};

/// Upper bound of the synthetic impact factor estimate
pub const IMPACT_FACTOR_CAP: f64 = 10.0;

/// Per-journal statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_papers: u64,
    pub indexed_papers: u64,

    /// Percentage of papers with status `INDEXED`, rounded; 0 for an empty
    /// journal
    pub indexing_rate: u64,

    /// Synthetic quality score in `[0, 10]` derived from indexing counts
    /// alone. This is an estimate, not a citation-based impact factor, and
    /// must never be presented as the standard metric.
    pub impact_factor_estimate: f64,

    /// Fixed 80/20 display split; the data model carries no paper-type field
    pub publications_by_type: BTreeMap<String, u64>,

    pub indexing_by_service: IndexingByService,
}

/// Per-service indexing view.
///
/// `scholar` is a verified-paper count while the remaining fields are
/// acceptance booleans. The asymmetry is longstanding API behavior that
/// clients depend on; changing it silently would break compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingByService {
    pub scholar: u64,
    pub scopus: bool,
    pub pubmed: bool,
    pub doaj: bool,
}

/// Compute per-journal statistics from its papers and database applications.
///
/// Pure over its inputs; empty collections produce all-zero stats rather
/// than dividing by zero. Inputs are assumed tenant-scoped by the caller.
pub fn journal_stats(
    papers: &[Paper],
    applications: &[(DatabaseApplication, DatabaseConfig)],
) -> JournalStats {
    let total_papers = papers.len() as u64;
    let indexed_papers = papers
        .iter()
        .filter(|p| p.indexing_status == IndexingStatus::Indexed)
        .count() as u64;

    let indexing_rate = if total_papers > 0 {
        ((indexed_papers as f64 / total_papers as f64) * 100.0).round() as u64
    } else {
        0
    };

    JournalStats {
        total_papers,
        indexed_papers,
        indexing_rate,
        impact_factor_estimate: impact_factor_estimate(total_papers, indexed_papers),
        publications_by_type: publications_by_type(total_papers),
        indexing_by_service: IndexingByService {
            // Papers verified by the Scholar verifier
            scholar: indexed_papers,
            scopus: has_accepted_service(applications, "scopus"),
            pubmed: has_accepted_service(applications, "pubmed"),
            doaj: has_accepted_service(applications, "doaj"),
        },
    }
}

/// Synthetic impact factor: bounded, monotonically non-decreasing in the
/// indexed-paper count, zero for an empty journal
pub fn impact_factor_estimate(total_papers: u64, indexed_papers: u64) -> f64 {
    if total_papers == 0 {
        return 0.0;
    }

    let base = (indexed_papers as f64 * 1.5) / (total_papers as f64 / 2.0);
    round2((base + indexed_papers as f64 * 0.1).min(IMPACT_FACTOR_CAP))
}

/// Display placeholder: 80% research articles, remainder reviews
fn publications_by_type(total_papers: u64) -> BTreeMap<String, u64> {
    let research = (total_papers as f64 * 0.8).round() as u64;
    let review = total_papers.saturating_sub(research);

    BTreeMap::from([
        ("Research Article".to_string(), research),
        ("Review".to_string(), review),
    ])
}

/// Whether an accepted application exists against a config whose name
/// case-insensitively contains the service name. Substring, not exact: a
/// config named "Pseudo-Scopus Clone" matches "scopus".
fn has_accepted_service(
    applications: &[(DatabaseApplication, DatabaseConfig)],
    service: &str,
) -> bool {
    applications.iter().any(|(app, config)| {
        config.name.to_lowercase().contains(service) && app.status == ApplicationStatus::Accepted
    })
}

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn paper(status: IndexingStatus) -> Paper {
        let now = Utc::now();
        Paper {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            journal_id: Uuid::new_v4(),
            title: "A Paper".to_string(),
            authors: "A. Author".to_string(),
            doi: format!("10.1234/{}", Uuid::new_v4()),
            indexing_status: status,
            scholar_url: None,
            pub_date: now.into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn papers(total: usize, indexed: usize) -> Vec<Paper> {
        (0..total)
            .map(|i| {
                paper(if i < indexed {
                    IndexingStatus::Indexed
                } else {
                    IndexingStatus::Pending
                })
            })
            .collect()
    }

    fn application(config_name: &str, status: ApplicationStatus) -> (DatabaseApplication, DatabaseConfig) {
        let now = Utc::now();
        let config_id = Uuid::new_v4();
        (
            DatabaseApplication {
                id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
                journal_id: Uuid::new_v4(),
                database_config_id: config_id,
                status,
                notes: None,
                submitted_at: None,
                created_at: now.into(),
                updated_at: now.into(),
            },
            DatabaseConfig {
                id: config_id,
                tenant_id: Uuid::new_v4(),
                name: config_name.to_string(),
                enabled: true,
                check_frequency: "WEEKLY".to_string(),
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
    }

    #[test]
    fn test_ten_papers_six_indexed() {
        let stats = journal_stats(&papers(10, 6), &[]);

        assert_eq!(stats.total_papers, 10);
        assert_eq!(stats.indexed_papers, 6);
        assert_eq!(stats.indexing_rate, 60);
        // round2(min((6*1.5)/(10/2) + 6*0.1, 10)) = round2(1.8 + 0.6) = 2.4
        assert_eq!(stats.impact_factor_estimate, 2.4);
    }

    #[test]
    fn test_empty_journal_all_zero() {
        let stats = journal_stats(&[], &[]);

        assert_eq!(stats.total_papers, 0);
        assert_eq!(stats.indexed_papers, 0);
        assert_eq!(stats.indexing_rate, 0);
        assert_eq!(stats.impact_factor_estimate, 0.0);
        assert_eq!(stats.publications_by_type["Research Article"], 0);
        assert_eq!(stats.publications_by_type["Review"], 0);
    }

    #[test]
    fn test_impact_factor_capped_at_ten() {
        // All indexed: base alone is 3.0, the +0.1 per paper pushes past 10
        let estimate = impact_factor_estimate(1000, 1000);
        assert_eq!(estimate, IMPACT_FACTOR_CAP);
    }

    #[test]
    fn test_impact_factor_monotone_in_indexed() {
        let mut last = 0.0;
        for indexed in 0..=20 {
            let estimate = impact_factor_estimate(20, indexed);
            assert!(estimate >= last);
            last = estimate;
        }
    }

    #[test]
    fn test_publications_split() {
        let stats = journal_stats(&papers(10, 0), &[]);
        assert_eq!(stats.publications_by_type["Research Article"], 8);
        assert_eq!(stats.publications_by_type["Review"], 2);

        let stats = journal_stats(&papers(1, 0), &[]);
        assert_eq!(stats.publications_by_type["Research Article"], 1);
        assert_eq!(stats.publications_by_type["Review"], 0);
    }

    #[test]
    fn test_scholar_is_a_count() {
        let stats = journal_stats(&papers(10, 6), &[]);
        assert_eq!(stats.indexing_by_service.scholar, 6);
    }

    #[test]
    fn test_service_flags_require_accepted() {
        let apps = vec![
            application("Scopus", ApplicationStatus::Accepted),
            application("PubMed", ApplicationStatus::UnderReview),
        ];
        let stats = journal_stats(&papers(1, 1), &apps);

        assert!(stats.indexing_by_service.scopus);
        assert!(!stats.indexing_by_service.pubmed);
        assert!(!stats.indexing_by_service.doaj);
    }

    #[test]
    fn test_service_name_match_is_substring() {
        let apps = vec![application("Pseudo-Scopus Clone", ApplicationStatus::Accepted)];
        let stats = journal_stats(&[], &apps);

        assert!(stats.indexing_by_service.scopus);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(journal_stats(&papers(2, 1), &[])).unwrap();
        assert!(json.get("totalPapers").is_some());
        assert!(json.get("impactFactorEstimate").is_some());
        assert_eq!(json["indexingByService"]["scholar"], 1);
    }
}
