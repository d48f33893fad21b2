// src/dashboard/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn dashboard_routes() -> Router {
    Router::new()
        .route("/api/dashboard/estadisticas", get(handlers::get_stats))
        .route(
            "/api/dashboard/produccion-mensual",
            get(handlers::get_monthly_production),
        )
        .route(
            "/api/dashboard/actividad-reciente",
            get(handlers::get_recent_activity),
        )
        .route("/api/dashboard/cultivos", get(handlers::get_crops))
}
