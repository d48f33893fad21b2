//! User data models

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Standard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Standard => "standard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "standard" => Ok(Role::Standard),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User database model. Holds the password hash, so it is never serialized;
/// responses go through [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let rol: String = row.try_get("rol")?;
        let role = rol.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "rol".to_string(),
            source: e.into(),
        })?;

        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("nombre")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            role,
            avatar: row.try_get("avatar")?,
            reset_token: row.try_get("reset_token")?,
            reset_token_expiry: row.try_get("reset_token_expiry")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Outward representation of a user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicUser {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub rol: Role,
    pub avatar: Option<String>,
    pub created_at: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nombre: user.name,
            email: user.email,
            rol: user.role,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

/// Insert payload for the credential store; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub avatar: Option<String>,
}

/// Partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub rol: Option<Role>,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateUserRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub rol: Option<Role>,
    pub avatar: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub total: usize,
}
