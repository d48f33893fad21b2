//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};
use crate::users::models::Role;

/// Authenticated user extractor
///
/// Runs the bearer token through signature/expiry/type validation and the
/// revocation list. Any failure rejects the request with a uniform 401;
/// there is no retry, the client has to log in again.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    /// The raw bearer token, kept so logout can revoke it
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with 403 unless the caller is an admin
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            warn!(user_id = %self.id, "Access denied: admin privileges required");
            Err(ApiError::Forbidden("Admin privileges required".to_string()))
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match bearer_token(&parts.headers) {
            Some(t) => t.to_string(),
            None => {
                warn!("Authentication failed: missing bearer token");
                return Err(ApiError::unauthorized());
            }
        };

        let (identity, expires_at) = app_state.tokens.verify_session_token(&token).map_err(|e| {
            warn!(error = %e, token = %safe_token_log(&token), "Session token validation failed");
            ApiError::unauthorized()
        })?;

        let revoked = app_state.blacklist.is_revoked(&token).await.map_err(|e| {
            error!(
                error = %e,
                user_id = %identity.id,
                "Database error during revocation lookup"
            );
            ApiError::DatabaseError(e)
        })?;

        if revoked {
            warn!(user_id = %identity.id, "Authentication failed: token revoked");
            return Err(ApiError::unauthorized());
        }

        debug!(
            user_id = %identity.id,
            email = %safe_email_log(&identity.email),
            role = %identity.role,
            "User authentication successful via extractor"
        );

        Ok(AuthedUser {
            id: identity.id,
            email: identity.email,
            role: identity.role,
            token,
            expires_at,
        })
    }
}
