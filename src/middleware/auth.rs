use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{api::AppState, error::AppError, models::CurrentUser};

/// Rejects requests without an identity and stores the [`CurrentUser`] in
/// request extensions for handlers
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state
        .identity
        .identify(request.headers())
        .await
        .inspect_err(|e| {
            tracing::warn!(provider = state.identity.name(), error = %e, "Identity resolution failed")
        })?
        .ok_or_else(AppError::not_logged_in)?;

    tracing::debug!(user = %user.email, "Request authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::not_logged_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let (mut parts, _body) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(CurrentUser::new("ada@example.com"));

        let user = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_extractor_rejects_anonymous() {
        let (mut parts, _body) = axum::http::Request::new(()).into_parts();

        let err = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
