/*
 * Responsibility
 * - v1 の request/response DTO (re-export)
 */
pub mod auth;
pub mod users;
