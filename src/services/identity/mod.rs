//! Identity resolution
//!
//! Signing in happens at the OAuth provider. Requests arrive carrying either
//! the provider's access token or, behind an auth proxy, a header naming the
//! user. Providers turn those into a [`CurrentUser`].
use axum::http::HeaderMap;

use crate::{error::AppResult, models::CurrentUser};

pub mod github;
pub mod header;

pub use github::{GithubClient, GithubIdentityProvider};
pub use header::HeaderIdentityProvider;

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the caller. `Ok(None)` when the request carries no credential.
    async fn identify(&self, headers: &HeaderMap) -> AppResult<Option<CurrentUser>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
