/*
 * Responsibility
 * - Users の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 * - password hash は response に決して出さない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::{Role, User, UserChanges};

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl UpdateUserRequest {
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
        Ok(())
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
