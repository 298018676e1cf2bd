//! Authentication and authorization utilities
//!
//! Provides:
//! - JWT token generation and validation
//! - Tenant context extraction
//! - Role-based access checks

use crate::db::models::UserRole;
use crate::errors::{AppError, Result};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Extracted authentication context available to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Tenant ID — the isolation boundary for every repository query
    pub tenant_id: Uuid,

    /// Request ID for tracing
    pub request_id: String,
}

impl AuthContext {
    /// Check whether the context carries one of the given roles.
    /// Admins pass every check.
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        self.role == UserRole::Admin || roles.contains(&self.role)
    }

    /// Require one of the given roles, returning Forbidden otherwise
    pub fn require_role(&self, roles: &[UserRole]) -> Result<()> {
        if self.has_role(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: "Insufficient permissions".to_string(),
            })
        }
    }

    /// Reject access to an entity owned by another tenant
    pub fn require_tenant(&self, tenant_id: Uuid) -> Result<()> {
        if self.tenant_id == tenant_id {
            Ok(())
        } else {
            Err(AppError::TenantMismatch)
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Tenant ID
    pub tenant_id: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Generate a new JWT token for an authenticated user
    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        tenant_id: Uuid,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            tenant_id: tenant_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::Unauthorized {
                    message: "Invalid token".to_string(),
                },
            })
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    Arc<JwtManager>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        // Extract request ID
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer)
            .ok_or_else(|| AppError::Unauthorized {
                message: "No token provided".to_string(),
            })?;

        let jwt: Arc<JwtManager> = Arc::from_ref(state);
        let claims = jwt.validate_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized {
            message: "Malformed token subject".to_string(),
        })?;
        let tenant_id = Uuid::parse_str(&claims.tenant_id).map_err(|_| AppError::Unauthorized {
            message: "Malformed tenant claim".to_string(),
        })?;

        Ok(AuthContext {
            user_id,
            email: claims.email,
            role: claims.role,
            tenant_id,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let token = manager
            .generate_token(user_id, "editor@test.com", UserRole::Editor, tenant_id)
            .unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "editor@test.com");
        assert_eq!(claims.role, UserRole::Editor);
        assert_eq!(claims.tenant_id, tenant_id.to_string());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let manager = JwtManager::new("test-secret", 3600);
        assert!(manager.validate_token("not-a-token").is_err());

        let other = JwtManager::new("other-secret", 3600);
        let token = other
            .generate_token(Uuid::new_v4(), "a@b.c", UserRole::User, Uuid::new_v4())
            .unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_admin_passes_role_checks() {
        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            email: "admin@test.com".to_string(),
            role: UserRole::Admin,
            tenant_id: Uuid::new_v4(),
            request_id: "r".to_string(),
        };
        assert!(ctx.has_role(&[UserRole::Editor]));
        assert!(ctx.require_role(&[UserRole::JournalManager]).is_ok());
    }

    #[test]
    fn test_tenant_mismatch() {
        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            email: "user@test.com".to_string(),
            role: UserRole::User,
            tenant_id: Uuid::new_v4(),
            request_id: "r".to_string(),
        };
        assert!(ctx.require_tenant(ctx.tenant_id).is_ok());
        assert!(ctx.require_tenant(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("Basic abc"), None);
    }
}
