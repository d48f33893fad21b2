// src/reports/mod.rs
//! PDF/Excel report requests over a typed set of report kinds

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::reports_routes;
pub use services::ReportRegistry;
