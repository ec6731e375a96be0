/*
 * Responsibility
 * - 認可 (authorization) の述語関数
 * - handler は保護対象の操作を実行する前にここを通す (失敗は Forbidden)
 */
use crate::api::v1::extractors::AuthCtx;
use crate::repos::user_repo::Role;

pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

/// Owner-or-admin rule: the principal may touch the resource when it is the
/// resource's owner, or when it holds the ADMIN role.
pub fn is_owner_or_admin(principal: &AuthCtx, resource_owner_username: &str) -> bool {
    principal.username == resource_owner_username || is_admin(principal.role)
}
