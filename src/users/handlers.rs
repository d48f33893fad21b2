//! User management handlers

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{
    CreateUserRequest, NewUser, PublicUser, UpdateUser, UpdateUserRequest, UserListResponse,
};
use crate::auth::models::MessageResponse;
use crate::auth::password::hash_password_blocking;
use crate::auth::AuthedUser;
use crate::common::{normalize_email, ApiError, AppState, Validator};

fn require_self_or_admin(authed: &AuthedUser, user_id: &str) -> Result<(), ApiError> {
    if authed.is_admin() || authed.id == user_id {
        Ok(())
    } else {
        warn!(
            user_id = %authed.id,
            target_user_id = %user_id,
            "Access denied: not the account owner"
        );
        Err(ApiError::Forbidden("Not allowed to access this user".to_string()))
    }
}

/// GET /api/usuarios - List all users (admin)
pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<UserListResponse>, ApiError> {
    authed.require_admin()?;

    let users: Vec<PublicUser> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

/// POST /api/usuarios - Create a user with an explicit role (admin)
pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    authed.require_admin()?;
    payload.validate(&payload).into_result()?;

    let password_hash = hash_password_blocking(payload.password).await?;
    let user = state
        .users
        .create(NewUser {
            name: payload.nombre,
            email: payload.email,
            password_hash,
            role: payload.rol,
            avatar: payload.avatar,
        })
        .await?;

    info!(
        admin_user_id = %authed.id,
        user_id = %user.id,
        "User created by admin"
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/usuarios/:id - Get one user (admin or self)
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    require_self_or_admin(&authed, &user_id)?;

    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// PUT /api/usuarios/:id - Update profile fields (admin or self; role changes are admin only)
pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    require_self_or_admin(&authed, &user_id)?;
    payload.validate(&payload).into_result()?;

    if payload.rol.is_some() && !authed.is_admin() {
        return Err(ApiError::Forbidden("Only admins can change roles".to_string()));
    }

    let email_changed = match &payload.email {
        Some(email) => state
            .users
            .find_by_id(&user_id)
            .await?
            .is_some_and(|u| u.email != normalize_email(email)),
        None => false,
    };

    let user = state
        .users
        .update_profile(
            &user_id,
            UpdateUser {
                name: payload.nombre,
                email: payload.email,
                role: payload.rol,
                avatar: payload.avatar,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // A pending reset token belongs to the old address
    if email_changed {
        state.users.clear_reset_token(&user.id).await?;
    }

    info!(user_id = %user.id, updated_by = %authed.id, "User updated");
    Ok(Json(user.into()))
}

/// DELETE /api/usuarios/:id - Delete a user (admin, never self)
pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    authed.require_admin()?;

    if authed.id == user_id {
        return Err(ApiError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    if !state.users.delete(&user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(admin_user_id = %authed.id, user_id = %user_id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}
