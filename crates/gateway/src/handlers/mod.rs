//! API handlers module

pub mod analytics;
pub mod audit;
pub mod auth;
pub mod databases;
pub mod health;
pub mod invitations;
pub mod journals;
pub mod papers;
pub mod reviewers;
