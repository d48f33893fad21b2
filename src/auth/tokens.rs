//! Session and password-reset token issuance and validation
//!
//! Both token kinds are HS256 JWTs signed with the same secret. The `typ`
//! claim keeps them apart: a reset token is never accepted as a session
//! token and vice versa.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use super::models::{Claims, Identity, TokenKind};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token type does not match")]
    WrongType,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("token lifetime overflows the calendar")]
    LifetimeOverflow,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, session_ttl: Duration, reset_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            session_ttl,
            reset_ttl,
        }
    }

    /// Signs a session token carrying the identity
    pub fn issue_session_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id.clone(),
            typ: TokenKind::Session,
            email: Some(identity.email.clone()),
            role: Some(identity.role),
            iat: now.timestamp(),
            exp: expiry_after(now, self.session_ttl)?,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Signs a short-lived reset token for `user_id`. The caller persists
    /// the token and its expiry next to the user record.
    pub fn issue_reset_token(&self, user_id: &str) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            typ: TokenKind::Reset,
            email: None,
            role: None,
            iat: now.timestamp(),
            exp: expiry_after(now, self.reset_ttl)?,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Checks signature, expiry and type; returns the embedded identity
    /// together with the token's expiry
    pub fn verify_session_token(
        &self,
        token: &str,
    ) -> Result<(Identity, DateTime<Utc>), TokenError> {
        let claims = self.decode(token)?;
        if claims.typ != TokenKind::Session {
            return Err(TokenError::WrongType);
        }
        let expires_at = timestamp_to_datetime(claims.exp)?;

        match (claims.email, claims.role) {
            (Some(email), Some(role)) => Ok((
                Identity {
                    id: claims.sub,
                    email,
                    role,
                },
                expires_at,
            )),
            _ => Err(TokenError::Malformed("missing identity claims".to_string())),
        }
    }

    /// Checks signature, expiry and the reset type marker; returns the user id
    pub fn verify_reset_token(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.decode(token)?;
        if claims.typ != TokenKind::Reset {
            return Err(TokenError::WrongType);
        }
        Ok(claims.sub)
    }

    fn sign(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)?;
        Ok(IssuedToken {
            token,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<i64, TokenError> {
    now.checked_add_signed(ttl)
        .map(|at| at.timestamp())
        .ok_or(TokenError::LifetimeOverflow)
}

fn timestamp_to_datetime(ts: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| TokenError::Malformed(format!("invalid exp {}", ts)))
}
