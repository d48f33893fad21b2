// src/dashboard/handlers.rs
//! Dashboard widgets. The figures are fixed until real farm data is wired in.

use axum::Json;
use tracing::debug;

use super::models::{
    ActivityKind, CropStatus, CropSummary, DashboardStats, MonthlyProduction, RecentActivity,
};
use crate::auth::AuthedUser;

pub fn stats() -> DashboardStats {
    DashboardStats {
        total_cultivos: 12,
        hectareas_cultivadas: 845.5,
        produccion_total_toneladas: 3250.0,
        ingresos_mes: 125_400.0,
        trabajadores_activos: 48,
        alertas_pendientes: 3,
    }
}

pub fn monthly_production() -> Vec<MonthlyProduction> {
    [
        ("Enero", 210.0, 8_400.0),
        ("Febrero", 245.0, 9_800.0),
        ("Marzo", 310.0, 12_400.0),
        ("Abril", 280.0, 11_200.0),
        ("Mayo", 355.0, 14_200.0),
        ("Junio", 390.0, 15_600.0),
    ]
    .into_iter()
    .map(|(mes, toneladas, ingresos)| MonthlyProduction {
        mes,
        toneladas,
        ingresos,
    })
    .collect()
}

pub fn recent_activity() -> Vec<RecentActivity> {
    vec![
        RecentActivity {
            id: 1,
            tipo: ActivityKind::Cosecha,
            descripcion: "Cosecha de maíz completada",
            parcela: "Parcela A-3",
            fecha: "2024-06-14",
        },
        RecentActivity {
            id: 2,
            tipo: ActivityKind::Riego,
            descripcion: "Riego programado por goteo",
            parcela: "Parcela B-1",
            fecha: "2024-06-13",
        },
        RecentActivity {
            id: 3,
            tipo: ActivityKind::Fumigacion,
            descripcion: "Control de plagas en soja",
            parcela: "Parcela C-2",
            fecha: "2024-06-12",
        },
        RecentActivity {
            id: 4,
            tipo: ActivityKind::Siembra,
            descripcion: "Siembra de trigo de invierno",
            parcela: "Parcela D-4",
            fecha: "2024-06-10",
        },
        RecentActivity {
            id: 5,
            tipo: ActivityKind::Mantenimiento,
            descripcion: "Revisión de tractor John Deere",
            parcela: "Galpón central",
            fecha: "2024-06-09",
        },
    ]
}

pub fn crops() -> Vec<CropSummary> {
    vec![
        CropSummary {
            cultivo: "Maíz",
            hectareas: 320.0,
            estado: CropStatus::Cosechado,
            rendimiento_estimado: 9.2,
        },
        CropSummary {
            cultivo: "Soja",
            hectareas: 280.5,
            estado: CropStatus::EnCrecimiento,
            rendimiento_estimado: 3.4,
        },
        CropSummary {
            cultivo: "Trigo",
            hectareas: 245.0,
            estado: CropStatus::ListoParaCosecha,
            rendimiento_estimado: 4.1,
        },
    ]
}

/// GET /api/dashboard/estadisticas
pub async fn get_stats(authed: AuthedUser) -> Json<DashboardStats> {
    debug!(user_id = %authed.id, "Serving dashboard statistics");
    Json(stats())
}

/// GET /api/dashboard/produccion-mensual
pub async fn get_monthly_production(_authed: AuthedUser) -> Json<Vec<MonthlyProduction>> {
    Json(monthly_production())
}

/// GET /api/dashboard/actividad-reciente
pub async fn get_recent_activity(_authed: AuthedUser) -> Json<Vec<RecentActivity>> {
    Json(recent_activity())
}

/// GET /api/dashboard/cultivos
pub async fn get_crops(_authed: AuthedUser) -> Json<Vec<CropSummary>> {
    Json(crops())
}
