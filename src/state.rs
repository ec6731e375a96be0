/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::user_repo::UserDirectory;
use crate::services::auth::flow::AuthFlow;
use crate::services::auth::token_service::TokenService;
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub tokens: TokenService,
    pub auth: AuthFlow,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        tokens: TokenService,
        auth: AuthFlow,
        users: UserService,
    ) -> Self {
        Self {
            directory,
            tokens,
            auth,
            users,
        }
    }
}
