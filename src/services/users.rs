use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::repos::user_repo::{User, UserChanges, UserDirectory};
use crate::services::auth::password::PasswordService;

/// User CRUD + password change. Authorization happens in the handlers
/// (fetch target first, then the owner-or-admin predicate); this service
/// only knows about records.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    passwords: PasswordService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, passwords: PasswordService) -> Self {
        Self { users, passwords }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        self.users
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("user"))
        }
    }

    /// Single atomic record update; both failure modes leave the stored
    /// credential untouched.
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
        confirmation_password: &str,
    ) -> Result<(), AppError> {
        let user = self.get(id).await?;

        if !self.passwords.matches(current_password, &user.password_hash) {
            return Err(AppError::bad_request("WRONG_PASSWORD", "wrong password"));
        }

        if new_password != confirmation_password {
            return Err(AppError::bad_request(
                "PASSWORD_MISMATCH",
                "passwords are not the same",
            ));
        }

        let password_hash = self.passwords.hash(new_password)?;
        if !self.users.update_password(id, &password_hash).await? {
            return Err(AppError::not_found("user"));
        }

        Ok(())
    }
}
