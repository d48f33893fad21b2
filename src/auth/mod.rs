//! # Auth Module
//!
//! Session and password-reset lifecycle:
//! - email/password login issuing signed session tokens
//! - single-use password reset tokens
//! - logout through a token revocation list
//! - AuthedUser extractor for protected routes

pub mod blacklist;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod tokens;
pub mod validators;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
