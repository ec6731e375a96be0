//! In-memory UserDirectory for tests. Mirrors the Postgres adapter's
//! contract, including the uniqueness violation on insert/update.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, Role, User, UserChanges, UserDirectory};

#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<Vec<User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

/// Test fixture: a user with an already-hashed password placeholder.
pub fn user(username: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        username: username.to_string(),
        password_hash: "unusable-hash".to_string(),
        role,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(RepoError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != id && u.username == changes.username)
        {
            return Err(RepoError::Conflict);
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.username = changes.username;
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
