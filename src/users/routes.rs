// src/users/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn users_routes() -> Router {
    Router::new()
        .route(
            "/api/usuarios",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/usuarios/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
}
