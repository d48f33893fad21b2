// src/reports/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn reports_routes() -> Router {
    Router::new()
        .route("/api/reportes", get(handlers::list_reports))
        .route("/api/reportes/pdf", post(handlers::generate_pdf))
        .route("/api/reportes/excel", post(handlers::generate_excel))
        .route("/api/reportes/:id", get(handlers::get_report))
}
