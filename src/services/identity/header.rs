use axum::http::{HeaderMap, HeaderName};

use super::IdentityProvider;
use crate::{
    error::{AppError, AppResult},
    models::CurrentUser,
};

/// Trusts an email header injected by an authenticating reverse proxy.
///
/// Only safe when the proxy strips the header from client requests.
#[derive(Clone)]
pub struct HeaderIdentityProvider {
    header: HeaderName,
}

impl HeaderIdentityProvider {
    pub fn new(header: &str) -> AppResult<Self> {
        let header = HeaderName::try_from(header.trim().to_ascii_lowercase())
            .map_err(|e| AppError::InvalidInput(format!("Invalid auth header name: {}", e)))?;
        Ok(Self { header })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn identify(&self, headers: &HeaderMap) -> AppResult<Option<CurrentUser>> {
        let Some(value) = headers.get(&self.header) else {
            return Ok(None);
        };

        let email = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed identity header".to_string()))?
            .trim();

        if email.is_empty() {
            return Ok(None);
        }
        if !email.contains('@') {
            return Err(AppError::Unauthorized(
                "Identity header does not hold an email".to_string(),
            ));
        }

        Ok(Some(CurrentUser::new(email.to_lowercase())))
    }

    fn name(&self) -> &'static str {
        "header"
    }
}
