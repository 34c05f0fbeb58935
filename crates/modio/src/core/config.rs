//! Configuration types for the client

use std::time::Duration;

const API_HOST: &str = "https://api.mod.io";
const TEST_API_HOST: &str = "https://api.test.mod.io";

/// How requests are authenticated
#[derive(Clone, PartialEq)]
pub enum Credentials {
    /// Read-only access, sent as the `api_key` query parameter
    ApiKey(String),
    /// OAuth 2 access token, sent as a bearer token. The api key is kept for
    /// endpoints that only accept one (email exchange).
    Token {
        token: String,
        api_key: Option<String>,
    },
}

impl Credentials {
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Credentials::ApiKey(key) => Some(key),
            Credentials::Token { api_key, .. } => api_key.as_deref(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Credentials::ApiKey(_) => None,
            Credentials::Token { token, .. } => Some(token),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey(***)"),
            Credentials::Token { api_key, .. } => f
                .debug_struct("Credentials::Token")
                .field("token", &"***")
                .field("has_api_key", &api_key.is_some())
                .finish(),
        }
    }
}

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overrides the computed host, used to point the client at a mock server
    pub base_url: Option<String>,
    /// API version segment
    pub version: String,
    /// ISO 639 language code sent as `Accept-Language`
    pub lang: String,
    /// Use the mod.io test environment
    pub test_env: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Root that every request path is appended to, e.g. `https://api.mod.io/v1`
    pub fn api_root(&self) -> String {
        let host = match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.test_env => TEST_API_HOST,
            None => API_HOST,
        };
        format!("{}/{}", host, self.version)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            version: "v1".to_string(),
            lang: "en".to_string(),
            test_env: false,
            timeout: Duration::from_secs(30),
            user_agent: concat!("modio-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root() {
        let mut config = ClientConfig::default();
        assert_eq!(config.api_root(), "https://api.mod.io/v1");

        config.test_env = true;
        assert_eq!(config.api_root(), "https://api.test.mod.io/v1");

        config.base_url = Some("http://127.0.0.1:4000/".to_string());
        assert_eq!(config.api_root(), "http://127.0.0.1:4000/v1");
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials::Token {
            token: "secret-token".to_string(),
            api_key: Some("secret-key".to_string()),
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
        assert_eq!(creds.token(), Some("secret-token"));
        assert_eq!(creds.api_key(), Some("secret-key"));
    }
}
