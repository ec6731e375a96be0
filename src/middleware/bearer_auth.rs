//! Bearer token authentication: header 抽出 → subject 抽出 → principal lookup
//! → validity check → AuthCtx を extensions に入れる
//!
//! The middleware itself never decides the final status for an authorization
//! failure. A missing header, an undecodable token, or a token that fails the
//! full validity check all continue the chain anonymous; the AuthCtx
//! extractor on protected handlers turns "anonymous" into 401. The one hard
//! rejection is a well-signed token whose subject has no backing user — that
//! is 401 here, never silently anonymous.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{error, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::BEARER_PREFIX;
use crate::state::AppState;

/// 認証を掛けたい Router に middleware を適用する。
///
/// 例：
/// ```ignore
/// let users = user_routes();
/// let users = middleware::bearer_auth::apply(users, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, bearer_auth))
}

async fn bearer_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Re-entrant invocation (nested routers): never authenticate twice.
    if req.extensions().get::<AuthCtx>().is_some() {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX));

    // No bearer header: anonymous pass-through. Downstream may still demand
    // authentication and reject.
    let Some(token) = token else {
        return Ok(next.run(req).await);
    };

    // Phase 1: cheap identity extraction, signature checked, expiry not.
    // Malformed tokens never reach the directory.
    let username = match state.tokens.extract_subject(token) {
        Ok(username) => username,
        Err(err) => {
            warn!(error = %err, "bearer token rejected");
            return Ok(next.run(req).await);
        }
    };

    let user = state
        .directory
        .find_by_username(&username)
        .await
        .map_err(|e| {
            error!(error = %e, "principal lookup failed");
            AppError::Internal
        })?
        .ok_or(AppError::Unauthorized)?;

    // Phase 2: full validity (subject match + expiry). Invalid leaves the
    // request anonymous rather than rejecting outright.
    if state.tokens.is_valid(token, &user) {
        req.extensions_mut().insert(AuthCtx::new(&user));
    }

    Ok(next.run(req).await)
}
