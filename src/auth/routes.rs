//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - Email/password login
/// - `POST /api/auth/register` - Self-service sign-up
/// - `POST /api/auth/forgot-password` - Issue a password reset token
/// - `POST /api/auth/reset-password` - Redeem a password reset token
/// - `POST /api/auth/logout` - Revoke the presented session token
/// - `POST /api/auth/change-password` - Change password while logged in
/// - `GET /api/auth/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/forgot-password", post(handlers::forgot_password))
        .route("/api/auth/reset-password", post(handlers::reset_password))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/change-password", post(handlers::change_password))
        .route("/api/auth/me", get(handlers::me))
}
