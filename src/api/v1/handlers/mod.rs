/*
 * Responsibility
 * - v1 handler 群 (re-export)
 */
pub mod auth;
pub mod health;
pub mod users;
