/*!
 * Authentication context extractor
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod auth_ctx;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
