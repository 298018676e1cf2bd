//! Reviewer recommendation by expertise-keyword overlap
//!
//! Scores every reviewer in a tenant's pool against one paper by substring
//! matching the reviewer's declared expertise keywords into the paper's
//! title and author text, plus a rating bonus. Returns the top five.

use serde::{Deserialize, Serialize};
use stmindex_common::db::models::{Paper, Reviewer};
use uuid::Uuid;

/// Points awarded per matched expertise keyword
pub const KEYWORD_MATCH_WEIGHT: f64 = 10.0;

/// Multiplier applied to the reviewer's rating, awarded unconditionally
pub const RATING_WEIGHT: f64 = 2.0;

/// Maximum entries in the ranked output
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A scored reviewer in the ranked output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub reviewer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub institution: Option<String>,

    /// Final score, rounded to the nearest integer
    pub score: i64,

    /// Matched keywords (lowercased, trimmed), in match order
    pub matched_keywords: Vec<String>,

    /// The reviewer's expertise string, echoed verbatim
    pub expertise: String,
}

/// Rank a tenant's reviewer pool against a paper.
///
/// The match corpus is the lowercased concatenation of title and authors.
/// Each expertise keyword (comma-split, trimmed, lowercased) that occurs
/// anywhere in the corpus as a contiguous substring contributes
/// [`KEYWORD_MATCH_WEIGHT`] points; `rating * `[`RATING_WEIGHT`] is added
/// regardless of overlap. Reviewers whose rounded score is zero or below
/// are dropped, the rest are ordered by score descending and truncated to
/// [`MAX_RECOMMENDATIONS`].
///
/// Ties keep reviewer input order (the sort is stable); this is the
/// documented tie-break.
///
/// Empty keywords, as produced by empty or malformed expertise strings,
/// are discarded before matching so they can never score.
pub fn recommend(paper: &Paper, reviewers: &[Reviewer]) -> Vec<Recommendation> {
    let corpus = format!("{} {}", paper.title, paper.authors).to_lowercase();

    let mut recommendations: Vec<Recommendation> = reviewers
        .iter()
        .filter_map(|reviewer| score_reviewer(&corpus, reviewer))
        .collect();

    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// Score one reviewer against the corpus; None when the score filter drops it
fn score_reviewer(corpus: &str, reviewer: &Reviewer) -> Option<Recommendation> {
    let mut score = 0.0;
    let mut matched_keywords = Vec::new();

    for keyword in expertise_keywords(&reviewer.expertise) {
        if corpus.contains(&keyword) {
            score += KEYWORD_MATCH_WEIGHT;
            matched_keywords.push(keyword);
        }
    }

    score += reviewer.rating * RATING_WEIGHT;

    let score = score.round() as i64;
    if score <= 0 {
        return None;
    }

    Some(Recommendation {
        reviewer_id: reviewer.id,
        first_name: reviewer.first_name.clone(),
        last_name: reviewer.last_name.clone(),
        email: reviewer.email.clone(),
        institution: reviewer.institution.clone(),
        score,
        matched_keywords,
        expertise: reviewer.expertise.clone(),
    })
}

/// Split an expertise string into normalized keywords: comma-separated,
/// trimmed, lowercased, order preserved, duplicates kept, empties dropped
fn expertise_keywords(expertise: &str) -> impl Iterator<Item = String> + '_ {
    expertise
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stmindex_common::db::models::IndexingStatus;

    fn paper(title: &str, authors: &str) -> Paper {
        let now = Utc::now();
        Paper {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            journal_id: Uuid::new_v4(),
            title: title.to_string(),
            authors: authors.to_string(),
            doi: "10.1234/test.001".to_string(),
            indexing_status: IndexingStatus::Pending,
            scholar_url: None,
            pub_date: now.into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn reviewer(first: &str, last: &str, expertise: &str, rating: f64) -> Reviewer {
        let now = Utc::now();
        Reviewer {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@test.com", first.to_lowercase(), last.to_lowercase()),
            institution: None,
            expertise: expertise.to_string(),
            rating,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_keyword_match_and_rating() {
        // 1 matched keyword (10) + round(4.5 * 2) = 19
        let paper = paper("Machine Learning in Academic Indexing", "John Doe,Jane Smith");
        let pool = vec![reviewer(
            "Alice",
            "Chen",
            "Machine Learning, Neural Networks, AI ethics",
            4.5,
        )];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 19);
        assert_eq!(ranked[0].matched_keywords, vec!["machine learning"]);
        assert_eq!(
            ranked[0].expertise,
            "Machine Learning, Neural Networks, AI ethics"
        );
    }

    #[test]
    fn test_substring_containment_not_tokenized() {
        // "index" occurs inside "Indexing"
        let paper = paper("Machine Learning in Academic Indexing", "John Doe");
        let pool = vec![reviewer("Bob", "Lee", "index", 0.0)];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 10);
        assert_eq!(ranked[0].matched_keywords, vec!["index"]);
    }

    #[test]
    fn test_author_text_is_part_of_corpus() {
        let paper = paper("Untitled", "John Doe,Jane Smith");
        let pool = vec![reviewer("Carol", "Diaz", "jane smith", 0.0)];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].matched_keywords, vec!["jane smith"]);
    }

    #[test]
    fn test_zero_rating_no_overlap_excluded() {
        let paper = paper("Quantum Chromodynamics", "E. Fermi");
        let pool = vec![reviewer("Dan", "Moss", "ornithology, botany", 0.0)];

        assert!(recommend(&paper, &pool).is_empty());
    }

    #[test]
    fn test_rating_scores_without_overlap() {
        let paper = paper("Quantum Chromodynamics", "E. Fermi");
        let pool = vec![reviewer("Eve", "Ng", "ornithology", 3.0)];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 6);
        assert!(ranked[0].matched_keywords.is_empty());
    }

    #[test]
    fn test_empty_inputs_empty_output() {
        let paper = paper("", "");
        assert!(recommend(&paper, &[]).is_empty());
    }

    #[test]
    fn test_empty_expertise_never_scores() {
        // "" and "a,,b" produce empty keywords after trimming; they must not
        // match everything
        let paper = paper("Some Title", "Some Author");
        let pool = vec![
            reviewer("Fay", "Orr", "", 0.0),
            reviewer("Gil", "Paz", " , ", 0.0),
        ];

        assert!(recommend(&paper, &pool).is_empty());
    }

    #[test]
    fn test_top_five_truncation_and_ordering() {
        let paper = paper("Deep Learning", "A. Author");
        let pool: Vec<Reviewer> = (1..=8)
            .map(|i| reviewer("R", &format!("{}", i), "deep learning", i as f64))
            .collect();

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);

        // Scores 10 + 2i, descending: highest-rated reviewers first
        let scores: Vec<i64> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![26, 24, 22, 20, 18]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let paper = paper("Deep Learning", "A. Author");
        let pool = vec![
            reviewer("First", "In", "deep learning", 2.0),
            reviewer("Second", "In", "deep learning", 2.0),
            reviewer("Third", "In", "deep learning", 2.0),
        ];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].first_name, "First");
        assert_eq!(ranked[1].first_name, "Second");
        assert_eq!(ranked[2].first_name, "Third");
    }

    #[test]
    fn test_duplicate_keywords_score_twice() {
        let paper = paper("Deep Learning Today", "A. Author");
        let pool = vec![reviewer("Hal", "Quinn", "deep learning, deep learning", 0.0)];

        let ranked = recommend(&paper, &pool);
        assert_eq!(ranked[0].score, 20);
        assert_eq!(
            ranked[0].matched_keywords,
            vec!["deep learning", "deep learning"]
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let paper = paper("Deep Learning", "A. Author");
        let pool = vec![reviewer("Ida", "Rey", "deep learning", 1.0)];

        let ranked = recommend(&paper, &pool);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert!(json.get("reviewerId").is_some());
        assert!(json.get("firstName").is_some());
        assert!(json.get("matchedKeywords").is_some());
        assert!(json.get("reviewer_id").is_none());
    }
}
