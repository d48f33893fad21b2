// src/main.rs
use axum::{extract::Extension, middleware, routing::get, Json, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod dashboard;
mod logging_middleware;
mod reports;
mod users;

use auth::password::hash_password_blocking;
use common::{safe_email_log, AppConfig, AppState};
use users::models::{NewUser, Role};
use users::store::UserStoreError;

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// GET /api/health - Liveness plus a database round trip
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "Health check database ping failed");
            "unavailable"
        }
    };
    Json(serde_json::json!({ "status": "ok", "database": database }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Full application router with state and middleware attached
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(health))
        .merge(auth::auth_routes())
        .merge(users::users_routes())
        .merge(dashboard::dashboard_routes())
        .merge(reports::reports_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Creates the configured admin account on first start
async fn ensure_bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let Some((email, password)) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password_blocking(password).await?;
    match state
        .users
        .create(NewUser {
            name: "Administrador".to_string(),
            email: email.clone(),
            password_hash,
            role: Some(Role::Admin),
            avatar: None,
        })
        .await
    {
        Ok(user) => info!(user_id = %user.id, email = %safe_email_log(&email), "Bootstrap admin created"),
        // Another instance won the race
        Err(UserStoreError::DuplicateEmail(_)) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    info!(
        session_ttl_secs = config.session_ttl.num_seconds(),
        reset_ttl_secs = config.reset_ttl.num_seconds(),
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let state = Arc::new(AppState::new(pool, config));

    if let Err(e) = ensure_bootstrap_admin(&state).await {
        warn!(error = %e, "Failed to create bootstrap admin");
    }

    match state.blacklist.purge_expired().await {
        Ok(purged) => info!(purged = purged, "Expired blacklist entries purged"),
        Err(e) => warn!(error = %e, "Failed to purge expired blacklist entries"),
    }

    let app = build_router(state);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
