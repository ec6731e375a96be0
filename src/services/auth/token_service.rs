use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::repos::user_repo::User;
use crate::services::auth::jwt::{Claims, JwtCodec, TokenError};

/// Issues and validates bearer tokens for a principal.
///
/// Validation is two-phase on purpose:
/// 1. `extract_subject` decodes and checks the signature only — cheap
///    identity extraction, so malformed tokens never trigger a user lookup.
/// 2. `is_valid` re-decodes and additionally checks subject match and
///    expiry before access is granted.
#[derive(Clone)]
pub struct TokenService {
    codec: JwtCodec,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl TokenService {
    pub fn new(codec: JwtCodec, access_ttl_seconds: u64, refresh_ttl_seconds: u64) -> Self {
        Self {
            codec,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        self.issue_at(user, Utc::now(), self.access_ttl_seconds)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AppError> {
        self.issue_at(user, Utc::now(), self.refresh_ttl_seconds)
    }

    fn issue_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Result<String, AppError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.username.clone(),
            iat,
            exp: iat + ttl_seconds as i64,
        };
        self.codec.encode(&claims)
    }

    /// Decode the token and return its subject. Does NOT check expiry —
    /// callers decide whether expiry matters (e.g. to report "expired"
    /// distinctly from "invalid").
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.codec.decode(token)?.sub)
    }

    /// Full validity check: decodes, subject matches the principal, not yet
    /// expired. Any failure is simply `false`, never an error.
    pub fn is_valid(&self, token: &str, user: &User) -> bool {
        self.is_valid_at(token, user, Utc::now())
    }

    fn is_valid_at(&self, token: &str, user: &User, now: DateTime<Utc>) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => claims.sub == user.username && now.timestamp() < claims.exp,
            Err(_) => false,
        }
    }
}
