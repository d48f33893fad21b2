// src/dashboard/models.rs

use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_cultivos: u32,
    pub hectareas_cultivadas: f64,
    pub produccion_total_toneladas: f64,
    pub ingresos_mes: f64,
    pub trabajadores_activos: u32,
    pub alertas_pendientes: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthlyProduction {
    pub mes: &'static str,
    pub toneladas: f64,
    pub ingresos: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Siembra,
    Riego,
    Cosecha,
    Fumigacion,
    Mantenimiento,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecentActivity {
    pub id: u32,
    pub tipo: ActivityKind,
    pub descripcion: &'static str,
    pub parcela: &'static str,
    pub fecha: &'static str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    EnCrecimiento,
    ListoParaCosecha,
    Cosechado,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CropSummary {
    pub cultivo: &'static str,
    pub hectareas: f64,
    pub estado: CropStatus,
    pub rendimiento_estimado: f64,
}
