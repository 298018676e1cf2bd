//! STM Index Common Library
//!
//! Shared code for the STM Index services including:
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability
//! - External integration clients (Scholar verifier, WordPress sync, mail)

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod mail;
pub mod metrics;
pub mod notify;
pub mod scholar;
pub mod wpsync;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// DOI prefix used by seeded and WordPress-imported papers
pub const SEED_DOI_PREFIX: &str = "10.5555";
