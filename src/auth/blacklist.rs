//! Revocation list for session tokens rejected before their natural expiry

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::common::safe_token_log;

pub struct TokenBlacklist {
    db: SqlitePool,
}

impl TokenBlacklist {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Records that `token` must be rejected until `expires_at`.
    /// Revoking the same token twice is a no-op.
    pub async fn revoke(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token, user_id, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at.timestamp())
        .execute(&self.db)
        .await?;

        info!(
            user_id = %user_id,
            token = %safe_token_log(token),
            "Token revoked"
        );

        // Lazy GC; stale rows only cost storage
        let purged = self.purge_expired().await?;
        if purged > 0 {
            debug!(purged = purged, "Purged expired blacklist entries");
        }

        Ok(())
    }

    /// True when a matching entry exists and its token is still within
    /// its validity window
    pub async fn is_revoked(&self, token: &str) -> Result<bool, sqlx::Error> {
        self.is_revoked_at(token, Utc::now()).await
    }

    /// Deletes entries whose token would be rejected as expired anyway
    pub async fn purge_expired(&self) -> Result<u64, sqlx::Error> {
        self.purge_expired_at(Utc::now()).await
    }

    // A token is still accepted during the second `now == exp`, so an entry
    // stays live through that second.
    async fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let revoked = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE token = ? AND expires_at >= ?)",
        )
        .bind(token)
        .bind(now.timestamp())
        .fetch_one(&self.db)
        .await?;

        Ok(revoked == 1)
    }

    async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::test_pool;
    use crate::auth::models::Identity;
    use crate::auth::tokens::TokenService;
    use crate::users::models::Role;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_revoke_then_is_revoked() {
        let blacklist = TokenBlacklist::new(test_pool().await);
        let expires = Utc::now() + Duration::days(7);

        assert!(!blacklist.is_revoked("tok-a").await.unwrap());
        blacklist.revoke("tok-a", "U_1", expires).await.unwrap();
        assert!(blacklist.is_revoked("tok-a").await.unwrap());
        assert!(!blacklist.is_revoked("tok-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let blacklist = TokenBlacklist::new(test_pool().await);
        let expires = Utc::now() + Duration::hours(1);

        blacklist.revoke("tok-a", "U_1", expires).await.unwrap();
        blacklist.revoke("tok-a", "U_1", expires).await.unwrap();
        assert!(blacklist.is_revoked("tok-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entry_does_not_block() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO token_blacklist (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind("old")
            .bind("U_1")
            .bind((Utc::now() - Duration::minutes(1)).timestamp())
            .execute(&pool)
            .await
            .unwrap();

        let blacklist = TokenBlacklist::new(pool);
        assert!(!blacklist.is_revoked("old").await.unwrap());
        assert_eq!(blacklist.purge_expired().await.unwrap(), 1);
        assert_eq!(blacklist.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entry_covers_final_second() {
        let blacklist = TokenBlacklist::new(test_pool().await);
        let exp = Utc.timestamp_opt(Utc::now().timestamp() + 3600, 0).unwrap();
        blacklist.revoke("tok-a", "U_1", exp).await.unwrap();

        assert!(blacklist.is_revoked_at("tok-a", exp).await.unwrap());
        assert_eq!(blacklist.purge_expired_at(exp).await.unwrap(), 0);

        let after = exp + Duration::seconds(1);
        assert!(!blacklist.is_revoked_at("tok-a", after).await.unwrap());
        assert_eq!(blacklist.purge_expired_at(after).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_revoked_token_rejected_in_its_final_second() {
        let tokens = TokenService::new("test_secret_key", Duration::hours(1), Duration::hours(1));
        let identity = Identity {
            id: "U_1".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Standard,
        };
        let issued = tokens.issue_session_token(&identity).unwrap();
        let blacklist = TokenBlacklist::new(test_pool().await);
        blacklist
            .revoke(&issued.token, "U_1", issued.expires_at)
            .await
            .unwrap();

        assert!(blacklist.is_revoked_at(&issued.token, issued.expires_at).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_purges_stale_rows() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO token_blacklist (token, user_id, expires_at) VALUES ('old', 'U_1', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let blacklist = TokenBlacklist::new(pool.clone());
        blacklist
            .revoke("fresh", "U_1", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM token_blacklist")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
