use std::sync::Arc;

use tracing::warn;

use crate::error::AppError;
use crate::repos::user_repo::{NewUser, Role, User, UserDirectory};
use crate::services::auth::{
    BEARER_PREFIX, password::PasswordService, token_service::TokenService,
};

/// Orchestrates registration, credential authentication and token refresh.
///
/// Stateless by design: there is no session store and no revocation list,
/// so logout is a client-side concern and issued tokens live until expiry.
#[derive(Clone)]
pub struct AuthFlow {
    users: Arc<dyn UserDirectory>,
    tokens: TokenService,
    passwords: PasswordService,
}

/// Service-level return type to keep handlers thin.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

impl AuthFlow {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        tokens: TokenService,
        passwords: PasswordService,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Register a new user. Everyone registers as USER; roles are not
    /// self-assignable through the public surface.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, AppError> {
        let password_hash = self.passwords.hash(password)?;

        let user = self
            .users
            .insert(NewUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                username: username.to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;

        self.token_pair(&user)
    }

    /// Authenticate with username + password. Unknown user and wrong
    /// password are deliberately indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username, "authentication failed: unknown user");
            return Err(AppError::Unauthorized);
        };

        if !self.passwords.matches(password, &user.password_hash) {
            warn!(username, "authentication failed: wrong password");
            return Err(AppError::Unauthorized);
        }

        self.token_pair(&user)
    }

    /// Exchange a refresh token (presented as a bearer header) for a fresh
    /// access token. The refresh token is returned unchanged — no rotation.
    ///
    /// Strict mode: a missing, malformed, unknown-subject or expired token
    /// is an explicit 401, never a silent no-op.
    pub async fn refresh(&self, auth_header: Option<&str>) -> Result<TokenPair, AppError> {
        let token = auth_header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .ok_or(AppError::Unauthorized)?;

        let username = self.tokens.extract_subject(token).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::Unauthorized
        })?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !self.tokens.is_valid(token, &user) {
            warn!(username = %username, "refresh token expired or not for this principal");
            return Err(AppError::Unauthorized);
        }

        Ok(TokenPair {
            access_token: self.tokens.issue_access_token(&user)?,
            refresh_token: token.to_string(),
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }

    fn token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.tokens.issue_access_token(user)?,
            refresh_token: self.tokens.issue_refresh_token(user)?,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }
}
