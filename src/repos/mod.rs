/*
 * Responsibility
 * - repo 層の公開インターフェース (re-export)
 */
pub mod error;
pub mod user_repo;

#[cfg(test)]
pub mod memory;

pub use user_repo::UserDirectory;
