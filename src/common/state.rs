// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::blacklist::TokenBlacklist;
use crate::auth::tokens::TokenService;
use crate::common::config::AppConfig;
use crate::reports::ReportRegistry;
use crate::users::store::UserStore;

/// Database pool, services and configuration, built once at startup
/// and handed to handlers through an axum `Extension`
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserStore>,
    pub blacklist: Arc<TokenBlacklist>,
    pub reports: Arc<ReportRegistry>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            config.session_ttl,
            config.reset_ttl,
        ));
        let users = Arc::new(UserStore::new(db.clone()));
        let blacklist = Arc::new(TokenBlacklist::new(db.clone()));

        Self {
            db,
            config,
            tokens,
            users,
            blacklist,
            reports: Arc::new(ReportRegistry::new()),
        }
    }
}
