//! Authentication handlers

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse, Identity, LoginRequest,
    MessageResponse, RegisterRequest, ResetPasswordRequest, SessionResponse,
};
use super::password::{hash_password_blocking, verify_password_blocking};
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::users::models::{NewUser, PublicUser, Role, User};

fn start_session(state: &AppState, user: User) -> Result<SessionResponse, ApiError> {
    let identity = Identity {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    let issued = state.tokens.issue_session_token(&identity)?;

    Ok(SessionResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user.into(),
    })
}

/// POST /api/auth/login
/// Exchanges email + password for a session token
///
/// # Response
/// ```json
/// { "token": "<jwt>", "expires_at": "...", "user": { ... } }
/// ```
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    payload.validate(&payload).into_result()?;

    let user = match state.users.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(
                email = %safe_email_log(&payload.email),
                "Login failed: unknown email"
            );
            return Err(ApiError::unauthorized());
        }
    };

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::unauthorized());
    }

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    Ok(Json(start_session(&state, user)?))
}

/// POST /api/auth/register
/// Self-service sign-up; always creates a standard user
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    payload.validate(&payload).into_result()?;

    let password_hash = hash_password_blocking(payload.password).await?;
    let user = state
        .users
        .create(NewUser {
            name: payload.nombre,
            email: payload.email,
            password_hash,
            role: Some(Role::Standard),
            avatar: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(start_session(&state, user)?)))
}

/// POST /api/auth/forgot-password
/// Issues a reset token and stores it next to the user record.
/// There is no mail transport, so the token is handed back in the body.
pub async fn forgot_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    payload.validate(&payload).into_result()?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            warn!(
                email = %safe_email_log(&payload.email),
                "Password reset requested for unknown email"
            );
            ApiError::NotFound("User not found".to_string())
        })?;

    let issued = state.tokens.issue_reset_token(&user.id)?;
    if !state
        .users
        .set_reset_token(&user.id, &issued.token, issued.expires_at)
        .await?
    {
        error!(user_id = %user.id, "User vanished while storing reset token");
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(
        user_id = %user.id,
        expires_at = %issued.expires_at,
        "Password reset token issued"
    );

    Ok(Json(ForgotPasswordResponse {
        message: "Password reset token issued".to_string(),
        reset_token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/auth/reset-password
/// Redeems a reset token exactly once
pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate(&payload).into_result()?;

    let user_id = state.tokens.verify_reset_token(&payload.token).map_err(|e| {
        warn!(error = %e, "Reset token validation failed");
        ApiError::unauthorized()
    })?;

    let owner = state.users.find_by_reset_token(&payload.token).await?;
    if owner.map(|u| u.id) != Some(user_id.clone()) {
        warn!(user_id = %user_id, "Reset token is not the user's pending token");
        return Err(ApiError::unauthorized());
    }

    let password_hash = hash_password_blocking(payload.password).await?;

    // Conditional update: a replayed or superseded token matches no row
    let redeemed = state
        .users
        .redeem_reset_token(&user_id, &payload.token, &password_hash)
        .await?;

    if !redeemed {
        warn!(user_id = %user_id, "Reset token already used or superseded");
        return Err(ApiError::unauthorized());
    }

    info!(user_id = %user_id, "Password reset completed");
    Ok(Json(MessageResponse::new("Password updated")))
}

/// POST /api/auth/logout
/// Puts the presented session token on the revocation list
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .blacklist
        .revoke(&authed.token, &authed.id, authed.expires_at)
        .await?;

    info!(user_id = %authed.id, "User logout successful");
    Ok(Json(MessageResponse::new("Logout successful")))
}

/// GET /api/auth/me
/// Returns the current authenticated user's information
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .find_by_id(&authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let user: PublicUser = user.into();
    Ok(Json(serde_json::json!({ "user": user })))
}

/// POST /api/auth/change-password
pub async fn change_password(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate(&payload).into_result()?;

    let user = state
        .users
        .find_by_id(&authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password_blocking(payload.current_password, user.password_hash).await {
        warn!(user_id = %authed.id, "Password change rejected: wrong current password");
        return Err(ApiError::unauthorized());
    }

    let password_hash = hash_password_blocking(payload.new_password).await?;
    state.users.update_password(&authed.id, &password_hash).await?;

    info!(user_id = %authed.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated")))
}
