/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型と extractor
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - リクエスト毎に extensions へ入るので、リクエスト間で共有されることはない
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::repos::user_repo::{Role, User};
use crate::state::AppState;

use uuid::Uuid;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - 不在 = anonymous
/// - 認可の述語 (owner-or-admin など) はこの型に対して評価される
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn new(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Handler で AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（認証がかかってない・ミドルウェア未設定）
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}
