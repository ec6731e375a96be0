/*
 * Responsibility
 * - /users 系 CRUD handler (認証必須)
 * - 対象ユーザーを先に取得 (404) → 認可述語 (403) → 操作の順で評価する
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::{auth::ChangePasswordRequest, users::{UpdateUserRequest, UserResponse}},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    services::auth::access,
    state::AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    if !access::is_admin(ctx.role) {
        return Err(AppError::Forbidden);
    }

    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get(id).await?;

    if !access::is_owner_or_admin(&ctx, &user.username) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let target = state.users.get(id).await?;
    if !access::is_owner_or_admin(&ctx, &target.username) {
        return Err(AppError::Forbidden);
    }

    let updated = state.users.update(id, req.into()).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let target = state.users.get(id).await?;
    if !access::is_owner_or_admin(&ctx, &target.username) {
        return Err(AppError::Forbidden);
    }

    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let target = state.users.get(id).await?;
    if !access::is_owner_or_admin(&ctx, &target.username) {
        return Err(AppError::Forbidden);
    }

    state
        .users
        .change_password(
            id,
            &req.current_password,
            &req.new_password,
            &req.confirmation_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
