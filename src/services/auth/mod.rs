/*
 * Responsibility
 * - 認証まわりの service 群 (codec / token / policy / password / flow)
 */
pub mod access;
pub mod flow;
pub mod jwt;
pub mod password;
pub mod token_service;

/// `Authorization` header prefix, space included. The header must read
/// `Authorization: Bearer <token>`; anything else is not a bearer request.
pub const BEARER_PREFIX: &str = "Bearer ";
