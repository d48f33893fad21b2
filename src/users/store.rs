//! Credential store over the `users` table
//!
//! This is the only writer of the reset-token pair. Email uniqueness is left
//! to the UNIQUE constraint so concurrent inserts cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{NewUser, Role, UpdateUser, User};
use crate::common::{generate_user_id, normalize_email, safe_email_log};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn map_write_error(e: sqlx::Error, email: &str) -> UserStoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() && db.message().contains("email") {
            return UserStoreError::DuplicateEmail(email.to_string());
        }
    }
    UserStoreError::Database(e)
}

const USER_COLUMNS: &str = "id, nombre, email, password, rol, avatar, reset_token, \
                            reset_token_expiry, created_at, updated_at";

pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC, email ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    /// Inserts a user, defaulting the role to `standard`
    pub async fn create(&self, new_user: NewUser) -> Result<User, UserStoreError> {
        let id = generate_user_id();
        let email = normalize_email(&new_user.email);
        let role = new_user.role.unwrap_or_default();

        sqlx::query(
            "INSERT INTO users (id, nombre, email, password, rol, avatar) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(new_user.name.trim())
        .bind(&email)
        .bind(&new_user.password_hash)
        .bind(role.as_str())
        .bind(new_user.avatar.as_deref())
        .execute(&self.db)
        .await
        .map_err(|e| map_write_error(e, &email))?;

        info!(
            user_id = %id,
            email = %safe_email_log(&email),
            role = %role,
            "User created"
        );

        self.find_by_id(&id)
            .await?
            .ok_or(UserStoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Applies a partial profile update; `Ok(None)` when the user does not exist
    pub async fn update_profile(
        &self,
        id: &str,
        update: UpdateUser,
    ) -> Result<Option<User>, UserStoreError> {
        let email = update.email.as_deref().map(normalize_email);

        let result = sqlx::query(
            r#"
            UPDATE users SET
                nombre = COALESCE(?, nombre),
                email = COALESCE(?, email),
                rol = COALESCE(?, rol),
                avatar = COALESCE(?, avatar),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(email.as_deref())
        .bind(update.role.map(|r: Role| r.as_str()))
        .bind(update.avatar.as_deref())
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| map_write_error(e, email.as_deref().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Replaces the password hash and drops any outstanding reset token
    pub async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
    ) -> Result<bool, UserStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                password = ?,
                reset_token = NULL,
                reset_token_expiry = NULL,
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, UserStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Stores a reset token and its expiry, replacing any previous one
    pub async fn set_reset_token(
        &self,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, UserStoreError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = ?, reset_token_expiry = ? WHERE id = ?",
        )
        .bind(token)
        .bind(expires_at.timestamp())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        debug!(user_id = %user_id, "Reset token stored");
        Ok(result.rows_affected() == 1)
    }

    pub async fn clear_reset_token(&self, user_id: &str) -> Result<(), UserStoreError> {
        sqlx::query("UPDATE users SET reset_token = NULL, reset_token_expiry = NULL WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Looks up the owner of an unexpired reset token
    pub async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE reset_token = ? AND reset_token_expiry > ?",
            USER_COLUMNS
        ))
        .bind(token)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Sets the new password and clears the reset pair in one conditional
    /// update. Returns false when the token is not the user's current,
    /// unexpired token, so a second redemption of the same token fails.
    pub async fn redeem_reset_token(
        &self,
        user_id: &str,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, UserStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                password = ?,
                reset_token = NULL,
                reset_token_expiry = NULL,
                updated_at = datetime('now')
            WHERE id = ? AND reset_token = ? AND reset_token_expiry > ?
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .bind(token)
        .bind(Utc::now().timestamp())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_password, verify_password};
    use crate::common::migrations::{create_schema, test_pool};
    use chrono::Duration;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_find_and_check_credentials() {
        let store = UserStore::new(test_pool().await);
        let created = store
            .create(new_user("Alice@Example.com", "semillas-123"))
            .await
            .unwrap();

        assert!(created.id.starts_with("U_"));
        assert_eq!(created.email, "alice@example.com");
        assert_eq!(created.role, Role::Standard);
        assert!(created.reset_token.is_none() && created.reset_token_expiry.is_none());

        let found = store.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(verify_password("semillas-123", &found.password_hash));

        let by_id = store.find_by_id(&created.id).await.unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let store = UserStore::new(test_pool().await);
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(store.find_by_id("U_NOPE00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = UserStore::new(test_pool().await);
        store.create(new_user("bob@example.com", "password-1")).await.unwrap();

        let err = store
            .create(new_user("BOB@example.com", "password-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserStoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_explicit_admin_role() {
        let store = UserStore::new(test_pool().await);
        let mut admin = new_user("root@example.com", "password-1");
        admin.role = Some(Role::Admin);
        let created = store.create(admin).await.unwrap();
        assert!(created.is_admin());
    }

    #[tokio::test]
    async fn test_reset_token_lifecycle() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("carla@example.com", "password-1")).await.unwrap();

        let expiry = Utc::now() + Duration::hours(1);
        assert!(store.set_reset_token(&user.id, "reset-1", expiry).await.unwrap());

        let owner = store.find_by_reset_token("reset-1").await.unwrap().unwrap();
        assert_eq!(owner.id, user.id);
        assert_eq!(owner.reset_token_expiry, Some(expiry.timestamp()));

        store.clear_reset_token(&user.id).await.unwrap();
        let cleared = store.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(cleared.reset_token.is_none() && cleared.reset_token_expiry.is_none());
        assert!(store.find_by_reset_token("reset-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_reset_token_not_found() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("dan@example.com", "password-1")).await.unwrap();

        store
            .set_reset_token(&user.id, "stale", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        assert!(store.find_by_reset_token("stale").await.unwrap().is_none());

        let hash = hash_password("password-2").unwrap();
        assert!(!store.redeem_reset_token(&user.id, "stale", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_redeem_succeeds_once() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("eva@example.com", "password-1")).await.unwrap();
        store
            .set_reset_token(&user.id, "reset-1", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let hash = hash_password("password-2").unwrap();
        assert!(store.redeem_reset_token(&user.id, "reset-1", &hash).await.unwrap());
        assert!(!store.redeem_reset_token(&user.id, "reset-1", &hash).await.unwrap());

        let updated = store.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(verify_password("password-2", &updated.password_hash));
        assert!(updated.reset_token.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_redemptions_only_one_wins() {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

        let path = std::env::temp_dir().join(format!("agro_api_{}.db", uuid::Uuid::new_v4()));
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();

        let store = UserStore::new(pool.clone());
        let user = store.create(new_user("gil@example.com", "password-1")).await.unwrap();
        store
            .set_reset_token(&user.id, "reset-1", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let first_hash = hash_password("password-2").unwrap();
        let second_hash = hash_password("password-3").unwrap();
        let (first, second) = tokio::join!(
            store.redeem_reset_token(&user.id, "reset-1", &first_hash),
            store.redeem_reset_token(&user.id, "reset-1", &second_hash),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }

        assert!(first ^ second, "exactly one redemption must succeed");
    }

    #[tokio::test]
    async fn test_newer_reset_token_replaces_older() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("fer@example.com", "password-1")).await.unwrap();
        let expiry = Utc::now() + Duration::hours(1);
        store.set_reset_token(&user.id, "first", expiry).await.unwrap();
        store.set_reset_token(&user.id, "second", expiry).await.unwrap();

        let hash = hash_password("password-2").unwrap();
        assert!(!store.redeem_reset_token(&user.id, "first", &hash).await.unwrap());
        assert!(store.redeem_reset_token(&user.id, "second", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_and_delete() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("gus@example.com", "password-1")).await.unwrap();
        store.create(new_user("taken@example.com", "password-1")).await.unwrap();

        let updated = store
            .update_profile(
                &user.id,
                UpdateUser {
                    name: Some("Gustavo".to_string()),
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Gustavo");
        assert_eq!(updated.email, "gus@example.com");
        assert_eq!(updated.role, Role::Admin);

        let clash = store
            .update_profile(
                &user.id,
                UpdateUser {
                    email: Some("taken@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(UserStoreError::DuplicateEmail(_))));

        assert!(store.update_profile("U_NOPE00", UpdateUser::default()).await.unwrap().is_none());

        assert!(store.delete(&user.id).await.unwrap());
        assert!(!store.delete(&user.id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_password_clears_reset_token() {
        let store = UserStore::new(test_pool().await);
        let user = store.create(new_user("hal@example.com", "password-1")).await.unwrap();
        store
            .set_reset_token(&user.id, "pending", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let hash = hash_password("password-9").unwrap();
        assert!(store.update_password(&user.id, &hash).await.unwrap());
        assert!(store.find_by_reset_token("pending").await.unwrap().is_none());
    }
}
