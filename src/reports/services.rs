// src/reports/services.rs
//! Report "generation": fabricates file metadata for a requested report and
//! keeps it in a process-local registry. The registry holds the newest
//! [`MAX_REPORTS`] entries; older ones are dropped.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{GeneratedReport, ReportFormat, ReportKind};
use crate::common::{generate_report_id, ValidationResult};

pub const MAX_REPORTS: usize = 500;

#[derive(Debug)]
pub struct ReportRegistry {
    reports: RwLock<VecDeque<GeneratedReport>>,
    capacity: usize,
}

impl Default for ReportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_REPORTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reports: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Builds the report metadata and records it
    pub async fn generate(
        &self,
        kind: ReportKind,
        format: ReportFormat,
        user_id: &str,
    ) -> GeneratedReport {
        let created_at = Utc::now();
        let report = GeneratedReport {
            id: generate_report_id(),
            nombre_archivo: report_filename(&kind, format, created_at),
            mime_type: format.mime_type(),
            tamano_bytes: fabricated_size(format),
            reporte: kind,
            formato: format,
            generado_por: user_id.to_string(),
            created_at,
        };

        info!(
            report_id = %report.id,
            user_id = %user_id,
            filename = %report.nombre_archivo,
            "Report generated"
        );

        let mut reports = self.reports.write().await;
        reports.push_back(report.clone());
        while reports.len() > self.capacity {
            reports.pop_front();
        }
        report
    }

    /// Newest first; `owner` restricts the listing to one user's reports
    pub async fn list(&self, owner: Option<&str>) -> Vec<GeneratedReport> {
        let reports = self.reports.read().await;
        reports
            .iter()
            .rev()
            .filter(|r| owner.map_or(true, |o| r.generado_por == o))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<GeneratedReport> {
        let reports = self.reports.read().await;
        reports.iter().find(|r| r.id == id).cloned()
    }
}

pub fn report_filename(kind: &ReportKind, format: ReportFormat, at: DateTime<Utc>) -> String {
    format!(
        "reporte_{}_{}.{}",
        kind.slug(),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn fabricated_size(format: ReportFormat) -> u64 {
    let mut rng = rand::thread_rng();
    match format {
        ReportFormat::Pdf => rng.gen_range(50_000..500_000),
        ReportFormat::Excel => rng.gen_range(20_000..200_000),
    }
}

/// Parameter checks the type system cannot express
pub fn validate_kind(kind: &ReportKind) -> ValidationResult {
    let mut result = ValidationResult::new();
    match kind {
        ReportKind::Produccion(params) => {
            if params.desde > params.hasta {
                result.add_error("parametros.desde", "Start date must not be after end date");
            }
        }
        ReportKind::Financiero(params) => {
            if !(2000..=2100).contains(&params.anio) {
                result.add_error("parametros.anio", "Year must be between 2000 and 2100");
            }
            if let Some(q) = params.trimestre {
                if !(1..=4).contains(&q) {
                    result.add_error("parametros.trimestre", "Quarter must be between 1 and 4");
                }
            }
        }
        ReportKind::Inventario(_) | ReportKind::Usuarios => {}
    }
    result
}
