/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (PgUserDirectory)
 * - UserDirectory trait で lookup/save/delete の契約を固定する
 * - DB エラーは RepoError に変換しやすい形で返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    pub username: String,
    // Never serialized outward; response DTOs omit it.
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    pub role: Role,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Full-replace update payload (PUT semantics). Password changes go through
/// `update_password` only.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// ユーザー格納先の契約
///
/// - username の一意性は backing store 側で強制する (violation は Conflict)
/// - handler/service/middleware はこの trait のみに依存する
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT "userId", "firstName", "lastName", "username", "passwordHash", "role", "createdAt"
            FROM users
            WHERE "username" = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT "userId", "firstName", "lastName", "username", "passwordHash", "role", "createdAt"
            FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT "userId", "firstName", "lastName", "username", "passwordHash", "role", "createdAt"
            FROM users
            ORDER BY "createdAt" DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users ("firstName", "lastName", "username", "passwordHash", "role")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING "userId", "firstName", "lastName", "username", "passwordHash", "role", "createdAt"
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET "firstName" = $2, "lastName" = $3, "username" = $4
            WHERE "userId" = $1
            RETURNING "userId", "firstName", "lastName", "username", "passwordHash", "role", "createdAt"
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET "passwordHash" = $2
            WHERE "userId" = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
