//! GitHub OAuth identity provider
//!
//! The browser signs in with GitHub and forwards the resulting access token as
//! `Authorization: Bearer <token>`. The token is resolved to an email through
//! the REST API:
//! 1. `GET /user` returns the public profile, including the email if public
//! 2. `GET /user/emails` (requires the `user:email` scope) lists all addresses;
//!    the primary verified one is used when the profile email is hidden
//!
//! Resolved identities are cached under the SHA-256 of the token, never the
//! token itself.
use axum::http::{header, HeaderMap, StatusCode};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::IdentityProvider;
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::CurrentUser,
};

const USER_AGENT: &str = concat!("cinema-guru/", env!("CARGO_PKG_VERSION"));

/// Resolves GitHub access tokens to the account's email
#[derive(Clone)]
pub struct GithubClient {
    http_client: HttpClient,
    api_url: String,
}

#[derive(Clone)]
pub struct GithubIdentityProvider {
    client: GithubClient,
    cache: Cache,
    cache_ttl: u64,
}

/// Subset of `GET /user`
#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    #[serde(default)]
    email: Option<String>,
}

/// Entry of `GET /user/emails`
#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GithubClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Looks up the account behind `token`, falling back to `/user/emails`
    /// when the profile email is private
    pub async fn fetch_identity(&self, token: &str) -> AppResult<CurrentUser> {
        let user: GithubUser = self.get_json(token, "/user").await?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                let emails: Vec<GithubEmail> = self.get_json(token, "/user/emails").await?;
                primary_verified_email(emails).ok_or_else(|| {
                    AppError::Unauthorized(format!(
                        "GitHub account {} has no verified primary email",
                        user.login
                    ))
                })?
            }
        };

        tracing::info!(login = %user.login, provider = "github", "Identity resolved");

        Ok(CurrentUser::new(email.to_lowercase()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, token: &str, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(
                "GitHub rejected the access token".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, path, body = %body, "GitHub API call failed");
            return Err(AppError::ExternalApi(format!(
                "GitHub API returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }
}

impl GithubIdentityProvider {
    pub fn new(cache: Cache, api_url: String, cache_ttl: u64) -> Self {
        Self {
            client: GithubClient::new(&api_url),
            cache,
            cache_ttl,
        }
    }

    async fn resolve_token(&self, token: &str) -> AppResult<CurrentUser> {
        cached!(
            self.cache,
            CacheKey::Identity(token_digest(token)),
            self.cache_ttl,
            self.client.fetch_identity(token)
        )
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GithubIdentityProvider {
    async fn identify(&self, headers: &HeaderMap) -> AppResult<Option<CurrentUser>> {
        match bearer_token(headers) {
            Some(token) => self.resolve_token(token).await.map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn primary_verified_email(emails: Vec<GithubEmail>) -> Option<String> {
    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderValue, response::IntoResponse};
    use serde_json::json;
    use wiremock::{
        matchers::{header as header_eq, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const TOKEN: &str = "gho_test_token";

    async fn mock_user(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header_eq("authorization", "Bearer gho_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mock_emails(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_identity_uses_profile_email() {
        let server = MockServer::start().await;
        mock_user(&server, json!({"login": "ada", "email": "Ada@Example.com"})).await;
        Mock::given(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let user = GithubClient::new(&server.uri())
            .fetch_identity(TOKEN)
            .await
            .unwrap();
        assert_eq!(user, CurrentUser::new("ada@example.com"));
    }

    #[tokio::test]
    async fn test_fetch_identity_falls_back_to_email_list() {
        let server = MockServer::start().await;
        mock_user(&server, json!({"login": "ada", "email": null})).await;
        mock_emails(
            &server,
            json!([
                {"email": "old@example.com", "primary": false, "verified": true},
                {"email": "ada@example.com", "primary": true, "verified": true}
            ]),
        )
        .await;

        let user = GithubClient::new(&format!("{}/", server.uri()))
            .fetch_identity(TOKEN)
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_fetch_identity_without_verified_primary_email() {
        let server = MockServer::start().await;
        mock_user(&server, json!({"login": "ada"})).await;
        mock_emails(
            &server,
            json!([{"email": "ada@example.com", "primary": true, "verified": false}]),
        )
        .await;

        let err = GithubClient::new(&server.uri())
            .fetch_identity(TOKEN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
            .mount(&server)
            .await;

        let err = GithubClient::new(&server.uri())
            .fetch_identity(TOKEN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_hides_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance on db-7.internal"))
            .mount(&server)
            .await;

        let err = GithubClient::new(&server.uri())
            .fetch_identity(TOKEN)
            .await
            .unwrap_err();
        match err {
            AppError::ExternalApi(msg) => {
                assert!(msg.contains("503"));
                assert!(!msg.contains("db-7.internal"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer gho_abc123"));
        assert_eq!(bearer_token(&headers), Some("gho_abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_token_digest_is_sha256_hex() {
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_primary_verified_email() {
        let emails: Vec<GithubEmail> = serde_json::from_str(
            r#"[
                {"email": "old@example.com", "primary": false, "verified": true, "visibility": null},
                {"email": "unverified@example.com", "primary": true, "verified": false, "visibility": null},
                {"email": "ada@example.com", "primary": true, "verified": true, "visibility": "private"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            primary_verified_email(emails),
            Some("ada@example.com".to_string())
        );
    }

    #[test]
    fn test_primary_verified_email_none() {
        let emails = vec![GithubEmail {
            email: "ada@example.com".to_string(),
            primary: false,
            verified: true,
        }];
        assert_eq!(primary_verified_email(emails), None);
    }

    #[test]
    fn test_github_user_deserialization() {
        let json = r#"{"login": "ada", "id": 1, "email": null, "name": "Ada"}"#;
        let user: GithubUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.login, "ada");
        assert_eq!(user.email, None);
    }
}
