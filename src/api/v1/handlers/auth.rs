/*
 * Responsibility
 * - /auth 系 handler (register / authenticate / refresh-token / logout)
 * - DTO validation → AuthFlow 呼び出し → TokenResponse へ map
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};

use crate::{
    api::v1::dto::auth::{AuthenticateRequest, RegisterRequest, TokenResponse},
    error::AppError,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let pair = state
        .auth
        .register(&req.first_name, &req.last_name, &req.username, &req.password)
        .await?;

    Ok(Json(pair.into()))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<AuthenticateRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let pair = state.auth.authenticate(&req.username, &req.password).await?;

    Ok(Json(pair.into()))
}

/// Exchanges `Authorization: Bearer <refresh token>` for a new access token.
/// The route is public; the refresh token itself is the credential.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let pair = state.auth.refresh(auth_header).await?;

    Ok(Json(pair.into()))
}

/// Tokens are stateless and there is no server-side session to clear; the
/// endpoint exists for API parity. Issued tokens stay valid until expiry.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}
