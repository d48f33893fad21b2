// src/reports/handlers.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::models::{GeneratedReport, ReportFormat, ReportKind, ReportListResponse};
use super::services::validate_kind;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

async fn generate(
    state: &AppState,
    authed: &AuthedUser,
    kind: ReportKind,
    format: ReportFormat,
) -> Result<(StatusCode, Json<GeneratedReport>), ApiError> {
    if kind.requires_admin() {
        authed.require_admin()?;
    }
    validate_kind(&kind).into_result()?;

    let report = state.reports.generate(kind, format, &authed.id).await;
    Ok((StatusCode::CREATED, Json(report)))
}

/// POST /api/reportes/pdf
pub async fn generate_pdf(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(kind): Json<ReportKind>,
) -> Result<(StatusCode, Json<GeneratedReport>), ApiError> {
    generate(&state, &authed, kind, ReportFormat::Pdf).await
}

/// POST /api/reportes/excel
pub async fn generate_excel(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(kind): Json<ReportKind>,
) -> Result<(StatusCode, Json<GeneratedReport>), ApiError> {
    generate(&state, &authed, kind, ReportFormat::Excel).await
}

/// GET /api/reportes - Admins see every report, others only their own
pub async fn list_reports(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Json<ReportListResponse> {
    let owner = (!authed.is_admin()).then_some(authed.id.as_str());
    let reports = state.reports.list(owner).await;
    Json(ReportListResponse {
        total: reports.len(),
        reports,
    })
}

/// GET /api/reportes/:id
pub async fn get_report(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(report_id): Path<String>,
) -> Result<Json<GeneratedReport>, ApiError> {
    let report = state
        .reports
        .get(&report_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    if report.generado_por != authed.id && !authed.is_admin() {
        warn!(user_id = %authed.id, report_id = %report_id, "Report access denied");
        return Err(ApiError::NotFound("Report not found".to_string()));
    }

    Ok(Json(report))
}
