//! Tenant-wide advanced analytics
//!
//! Citation figures here are derived from simulated per-paper counts and are
//! not reproducible between calls. The RNG is injected so callers own the
//! source of randomness; the h-index and i10-index helpers are pure and
//! deterministic over a given citation vector.

use chrono::{DateTime, Datelike, Months, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use stmindex_common::db::models::{DatabaseConfig, IndexingStatus, Journal, Paper};
use uuid::Uuid;

/// Exclusive upper bound for simulated per-paper citation counts
pub const SIMULATED_CITATION_BOUND: u32 = 50;

/// Months covered by the trailing indexing trend
pub const TREND_MONTHS: u32 = 6;

/// Entries in the top-papers list
pub const TOP_PAPERS: usize = 5;

/// Placeholder average until verification timestamps are tracked per paper
const AVG_TIME_TO_INDEX_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedAnalytics {
    pub overview: Overview,
    pub citation_metrics: CitationMetrics,
    pub indexing_trends: Vec<TrendBucket>,
    pub top_papers: Vec<TopPaper>,
    pub database_coverage: Vec<DatabaseCoverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_papers: u64,
    pub indexed_papers: u64,

    /// Indexed share as an unrounded percentage, 0 for an empty tenant
    pub indexing_trend: f64,

    pub avg_time_to_index: u32,
}

/// Simulated citation figures. Non-reproducible between calls by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationMetrics {
    pub total_citations: u64,
    pub h_index: u32,
    pub i10_index: u32,
    pub avg_citations_per_paper: f64,
}

/// One month of the trailing indexing trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    /// Month label, e.g. "Mar 2026"
    pub month: String,
    pub indexed: u64,
    pub not_indexed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPaper {
    pub id: Uuid,
    pub title: String,
    pub citations: u32,
    pub indexing_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCoverage {
    pub name: String,
    pub journals_indexed: u64,
    pub total_journals: u64,

    /// `journals_indexed / total_journals * 100`, 0 when the tenant has no
    /// journals
    pub coverage: f64,
}

/// Compute tenant-wide analytics over all of a tenant's papers and journals.
///
/// `coverage` pairs each database config with its accepted-application count.
/// `now` anchors the 6-month trend window so callers and tests control the
/// clock. Pure apart from draws on `rng`.
pub fn advanced_analytics(
    papers: &[Paper],
    journals: &[Journal],
    coverage: &[(DatabaseConfig, u64)],
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> AdvancedAnalytics {
    let total_papers = papers.len() as u64;
    let indexed_papers = papers
        .iter()
        .filter(|p| p.indexing_status == IndexingStatus::Indexed)
        .count() as u64;

    let indexing_trend = if total_papers > 0 {
        indexed_papers as f64 / total_papers as f64 * 100.0
    } else {
        0.0
    };

    // One simulated citation count per paper, association preserved so the
    // top-papers list reports each paper's own draw
    let cited: Vec<(&Paper, u32)> = papers
        .iter()
        .map(|p| (p, rng.gen_range(0..SIMULATED_CITATION_BOUND)))
        .collect();
    let citations: Vec<u32> = cited.iter().map(|(_, c)| *c).collect();

    AdvancedAnalytics {
        overview: Overview {
            total_papers,
            indexed_papers,
            indexing_trend,
            avg_time_to_index: AVG_TIME_TO_INDEX_DAYS,
        },
        citation_metrics: citation_metrics(&citations),
        indexing_trends: indexing_trends(papers, now),
        top_papers: top_papers(&cited),
        database_coverage: database_coverage(journals.len() as u64, coverage),
    }
}

/// Largest `h` such that at least `h` papers have at least `h` citations each
pub fn h_index(citations: &[u32]) -> u32 {
    let mut sorted: Vec<u32> = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut h = 0;
    for (i, &c) in sorted.iter().enumerate() {
        if c as usize > i {
            h = i as u32 + 1;
        } else {
            break;
        }
    }
    h
}

/// Count of papers with at least ten citations
pub fn i10_index(citations: &[u32]) -> u32 {
    citations.iter().filter(|&&c| c >= 10).count() as u32
}

fn citation_metrics(citations: &[u32]) -> CitationMetrics {
    let total_citations: u64 = citations.iter().map(|&c| c as u64).sum();
    let avg_citations_per_paper = if citations.is_empty() {
        0.0
    } else {
        total_citations as f64 / citations.len() as f64
    };

    CitationMetrics {
        total_citations,
        h_index: h_index(citations),
        i10_index: i10_index(citations),
        avg_citations_per_paper,
    }
}

/// Trailing six calendar months ending at `now`, oldest first, papers
/// bucketed by creation month
fn indexing_trends(papers: &[Paper], now: DateTime<Utc>) -> Vec<TrendBucket> {
    (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let anchor = now
                .checked_sub_months(Months::new(back))
                .unwrap_or(now);
            let (year, month) = (anchor.year(), anchor.month());

            let mut indexed = 0;
            let mut not_indexed = 0;
            for paper in papers {
                let created = paper.created_at.with_timezone(&Utc);
                if created.year() == year && created.month() == month {
                    if paper.indexing_status == IndexingStatus::Indexed {
                        indexed += 1;
                    } else {
                        not_indexed += 1;
                    }
                }
            }

            TrendBucket {
                month: anchor.format("%b %Y").to_string(),
                indexed,
                not_indexed,
            }
        })
        .collect()
}

/// First [`TOP_PAPERS`] papers ranked by their simulated citation draw
fn top_papers(cited: &[(&Paper, u32)]) -> Vec<TopPaper> {
    let mut head: Vec<&(&Paper, u32)> = cited.iter().take(TOP_PAPERS).collect();
    head.sort_by(|a, b| b.1.cmp(&a.1));

    head.into_iter()
        .map(|(paper, citations)| TopPaper {
            id: paper.id,
            title: paper.title.clone(),
            citations: *citations,
            indexing_status: paper.indexing_status.as_str().to_string(),
        })
        .collect()
}

fn database_coverage(
    total_journals: u64,
    coverage: &[(DatabaseConfig, u64)],
) -> Vec<DatabaseCoverage> {
    coverage
        .iter()
        .map(|(config, accepted)| DatabaseCoverage {
            name: config.name.clone(),
            journals_indexed: *accepted,
            total_journals,
            coverage: if total_journals > 0 {
                *accepted as f64 / total_journals as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::mock::StepRng;

    fn paper_created(status: IndexingStatus, created_at: DateTime<Utc>) -> Paper {
        Paper {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            journal_id: Uuid::new_v4(),
            title: "A Paper".to_string(),
            authors: "A. Author".to_string(),
            doi: format!("10.1234/{}", Uuid::new_v4()),
            indexing_status: status,
            scholar_url: None,
            pub_date: created_at.into(),
            created_at: created_at.into(),
            updated_at: created_at.into(),
        }
    }

    fn journal() -> Journal {
        let now = Utc::now();
        Journal {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "International Journal of STM Research".to_string(),
            code: "IJSR".to_string(),
            issn: "2456-1234".to_string(),
            status: stmindex_common::db::models::JournalStatus::Active,
            wordpress_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn config(name: &str) -> DatabaseConfig {
        let now = Utc::now();
        DatabaseConfig {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: name.to_string(),
            enabled: true,
            check_frequency: "WEEKLY".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_h_index() {
        assert_eq!(h_index(&[]), 0);
        assert_eq!(h_index(&[0, 0, 0]), 0);
        assert_eq!(h_index(&[1]), 1);
        assert_eq!(h_index(&[10, 8, 5, 4, 3]), 4);
        assert_eq!(h_index(&[25, 8, 5, 3, 3]), 3);
        assert_eq!(h_index(&[5, 5, 5, 5, 5]), 5);
    }

    #[test]
    fn test_i10_index() {
        assert_eq!(i10_index(&[]), 0);
        assert_eq!(i10_index(&[9, 10, 11, 3]), 2);
        assert_eq!(i10_index(&[10, 10, 10]), 3);
    }

    #[test]
    fn test_citation_metrics_empty() {
        let metrics = citation_metrics(&[]);
        assert_eq!(metrics.total_citations, 0);
        assert_eq!(metrics.h_index, 0);
        assert_eq!(metrics.i10_index, 0);
        assert_eq!(metrics.avg_citations_per_paper, 0.0);
    }

    #[test]
    fn test_empty_tenant_does_not_divide_by_zero() {
        let mut rng = StepRng::new(0, 1);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();

        let analytics = advanced_analytics(&[], &[], &[], now, &mut rng);

        assert_eq!(analytics.overview.total_papers, 0);
        assert_eq!(analytics.overview.indexing_trend, 0.0);
        assert!(analytics.top_papers.is_empty());
        assert_eq!(analytics.indexing_trends.len(), TREND_MONTHS as usize);
    }

    #[test]
    fn test_overview_trend_percent() {
        let mut rng = StepRng::new(0, 1);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let papers = vec![
            paper_created(IndexingStatus::Indexed, now),
            paper_created(IndexingStatus::Pending, now),
            paper_created(IndexingStatus::Pending, now),
            paper_created(IndexingStatus::Indexed, now),
        ];

        let analytics = advanced_analytics(&papers, &[], &[], now, &mut rng);
        assert_eq!(analytics.overview.total_papers, 4);
        assert_eq!(analytics.overview.indexed_papers, 2);
        assert_eq!(analytics.overview.indexing_trend, 50.0);
        assert_eq!(analytics.overview.avg_time_to_index, 7);
    }

    #[test]
    fn test_trend_buckets_oldest_first_by_creation_month() {
        let mut rng = StepRng::new(0, 1);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2026, 7, 2, 0, 0, 0).unwrap();
        let march = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        let ancient = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let papers = vec![
            paper_created(IndexingStatus::Indexed, july),
            paper_created(IndexingStatus::Pending, july),
            paper_created(IndexingStatus::Indexed, march),
            paper_created(IndexingStatus::Indexed, ancient),
        ];

        let trends = advanced_analytics(&papers, &[], &[], now, &mut rng).indexing_trends;
        assert_eq!(trends.len(), 6);
        assert_eq!(trends[0].month, "Mar 2026");
        assert_eq!(trends[5].month, "Aug 2026");

        assert_eq!(trends[0].indexed, 1);
        assert_eq!(trends[0].not_indexed, 0);

        let july_bucket = trends.iter().find(|t| t.month == "Jul 2026").unwrap();
        assert_eq!(july_bucket.indexed, 1);
        assert_eq!(july_bucket.not_indexed, 1);

        // Papers outside the window are not counted anywhere
        let total: u64 = trends.iter().map(|t| t.indexed + t.not_indexed).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_top_papers_sorted_by_citations_desc() {
        let mut rng = StepRng::new(0, 1 << 40);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let papers: Vec<Paper> = (0..8)
            .map(|_| paper_created(IndexingStatus::Indexed, now))
            .collect();

        let top = advanced_analytics(&papers, &[], &[], now, &mut rng).top_papers;
        assert_eq!(top.len(), TOP_PAPERS);
        for pair in top.windows(2) {
            assert!(pair[0].citations >= pair[1].citations);
        }
        for paper in &top {
            assert!(paper.citations < SIMULATED_CITATION_BOUND);
            assert_eq!(paper.indexing_status, "INDEXED");
        }
    }

    #[test]
    fn test_database_coverage_ratio() {
        let mut rng = StepRng::new(0, 1);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let journals = vec![journal(), journal(), journal(), journal()];
        let coverage = vec![(config("Scopus"), 3), (config("DOAJ"), 0)];

        let analytics = advanced_analytics(&[], &journals, &coverage, now, &mut rng);

        assert_eq!(analytics.database_coverage.len(), 2);
        assert_eq!(analytics.database_coverage[0].name, "Scopus");
        assert_eq!(analytics.database_coverage[0].journals_indexed, 3);
        assert_eq!(analytics.database_coverage[0].total_journals, 4);
        assert_eq!(analytics.database_coverage[0].coverage, 75.0);
        assert_eq!(analytics.database_coverage[1].coverage, 0.0);
    }

    #[test]
    fn test_coverage_zero_journals() {
        let entries = database_coverage(0, &[(config("Scopus"), 2)]);
        assert_eq!(entries[0].coverage, 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut rng = StepRng::new(0, 1);
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let papers = vec![paper_created(IndexingStatus::Indexed, now)];

        let json =
            serde_json::to_value(advanced_analytics(&papers, &[], &[], now, &mut rng)).unwrap();
        assert!(json["overview"].get("totalPapers").is_some());
        assert!(json["overview"].get("avgTimeToIndex").is_some());
        assert!(json["citationMetrics"].get("hIndex").is_some());
        assert!(json["citationMetrics"].get("i10Index").is_some());
        assert!(json.get("indexingTrends").is_some());
        assert!(json.get("databaseCoverage").is_some());
    }
}
