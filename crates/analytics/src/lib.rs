//! STM Index Scoring Core
//!
//! Pure scoring functions over already-materialized entity rows:
//! - Reviewer recommendation by expertise-keyword overlap
//! - Per-journal indexing statistics
//! - Tenant-wide advanced analytics
//!
//! Nothing in this crate performs I/O or owns shared state. Callers resolve
//! entities through the repository, invoke these functions, and serialize
//! the results. Inputs are assumed tenant-scoped by the caller.

pub mod advanced;
pub mod recommender;
pub mod stats;

pub use advanced::{advanced_analytics, h_index, i10_index, AdvancedAnalytics};
pub use recommender::{recommend, Recommendation};
pub use stats::{journal_stats, JournalStats};
