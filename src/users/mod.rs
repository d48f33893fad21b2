// src/users/mod.rs
//! User records: the credential store plus admin user management

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;


pub use routes::users_routes;
