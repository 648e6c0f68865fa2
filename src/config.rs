use serde::Deserialize;

/// How requests are mapped to a user
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Resolve `Authorization: Bearer` tokens against the GitHub API
    Github,
    /// Trust an email header set by an upstream auth proxy
    Header,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. Without one the catalog lives in memory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL, used to cache resolved identities
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_auth_mode")]
    pub auth_mode: AuthMode,

    /// Header carrying the user's email when `auth_mode` is `header`
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Seconds a resolved identity stays cached
    #[serde(default = "default_identity_cache_ttl")]
    pub identity_cache_ttl: u64,

    /// Titles per page on catalog, favorites and watch-later listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Entries per page on the activity feed
    #[serde(default = "default_activity_page_size")]
    pub activity_page_size: u32,

    /// Insert the sample catalog at startup when the catalog is empty
    #[serde(default = "default_seed_catalog")]
    pub seed_catalog: bool,

    /// Browser origin allowed by CORS. Unset means any origin.
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_auth_mode() -> AuthMode {
    AuthMode::Github
}

fn default_auth_header() -> String {
    "x-forwarded-email".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_identity_cache_ttl() -> u64 {
    300
}

fn default_page_size() -> u32 {
    6
}

fn default_activity_page_size() -> u32 {
    10
}

fn default_seed_catalog() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 || self.activity_page_size == 0 {
            anyhow::bail!("PAGE_SIZE and ACTIVITY_PAGE_SIZE must be positive");
        }
        if self.auth_mode == AuthMode::Header && self.auth_header.trim().is_empty() {
            anyhow::bail!("AUTH_HEADER must be set when AUTH_MODE=header");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_iter(vars(&[])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.auth_mode, AuthMode::Github);
        assert_eq!(config.page_size, 6);
        assert_eq!(config.activity_page_size, 10);
        assert!(config.seed_catalog);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/cinema"),
            ("AUTH_MODE", "header"),
            ("AUTH_HEADER", "x-auth-request-email"),
            ("PAGE_SIZE", "12"),
            ("SEED_CATALOG", "false"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/cinema")
        );
        assert_eq!(config.auth_mode, AuthMode::Header);
        assert_eq!(config.auth_header, "x-auth-request-email");
        assert_eq!(config.page_size, 12);
        assert!(!config.seed_catalog);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(Config::from_iter(vars(&[("PAGE_SIZE", "0")])).is_err());
    }

    #[test]
    fn test_rejects_unknown_auth_mode() {
        assert!(Config::from_iter(vars(&[("AUTH_MODE", "saml")])).is_err());
    }
}
