//! Rate limiting middleware using token bucket algorithm
//!
//! Two buckets: a general one covering all API traffic and a stricter
//! per-minute one applied to the login route only.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use stmindex_common::errors::AppError;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create the general API rate limiter
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Arc<GlobalRateLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap())
        .allow_burst(NonZeroU32::new(burst.max(1)).unwrap());

    Arc::new(RateLimiter::direct(quota))
}

/// Create the stricter login rate limiter
pub fn create_login_limiter(attempts_per_minute: u32) -> Arc<GlobalRateLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(attempts_per_minute.max(1)).unwrap());

    Arc::new(RateLimiter::direct(quota))
}

/// State carried into the rate limit middleware
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<GlobalRateLimiter>,
    enabled: bool,
}

impl RateLimitState {
    pub fn new(limiter: Arc<GlobalRateLimiter>, enabled: bool) -> Self {
        Self { limiter, enabled }
    }
}

/// Rate limiting middleware
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.enabled {
        return Ok(next.run(request).await);
    }

    match state.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(100, 200);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_login_limiter_exhausts() {
        let limiter = create_login_limiter(2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
