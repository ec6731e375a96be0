/*
 * Responsibility
 * - 認証系 endpoint の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::flow::TokenPair;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_name.trim().is_empty() {
            return Err("first_name is required");
        }
        if self.last_name.trim().is_empty() {
            return Err("last_name is required");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.len() < 3 {
            return Err("password must be at least 3 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

impl AuthenticateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirmation_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.current_password.is_empty() {
            return Err("current_password is required");
        }
        if self.new_password.len() < 3 {
            return Err("new_password must be at least 3 chars");
        }
        if self.confirmation_password.len() < 3 {
            return Err("confirmation_password must be at least 3 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_string(),
            expires_in: pair.expires_in,
        }
    }
}
