// src/reports/models.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Excel,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionParams {
    pub desde: NaiveDate,
    pub hasta: NaiveDate,
    #[serde(default)]
    pub cultivo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryParams {
    #[serde(default)]
    pub almacen: Option<String>,
    #[serde(default)]
    pub incluir_agotados: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialParams {
    pub anio: i32,
    #[serde(default)]
    pub trimestre: Option<u8>,
}

/// The finite set of reports, each with its own parameter shape.
/// Wire form: `{"tipo": "produccion", "parametros": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "tipo", content = "parametros", rename_all = "snake_case")]
pub enum ReportKind {
    Produccion(ProductionParams),
    Inventario(InventoryParams),
    Financiero(FinancialParams),
    Usuarios,
}

impl ReportKind {
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Produccion(_) => "produccion",
            ReportKind::Inventario(_) => "inventario",
            ReportKind::Financiero(_) => "financiero",
            ReportKind::Usuarios => "usuarios",
        }
    }

    /// Reports exposing other users' data
    pub fn requires_admin(&self) -> bool {
        matches!(self, ReportKind::Usuarios | ReportKind::Financiero(_))
    }
}

/// Metadata of a generated report; no document is rendered
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeneratedReport {
    pub id: String,
    pub reporte: ReportKind,
    pub formato: ReportFormat,
    pub nombre_archivo: String,
    pub mime_type: &'static str,
    pub tamano_bytes: u64,
    pub generado_por: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<GeneratedReport>,
    pub total: usize,
}
