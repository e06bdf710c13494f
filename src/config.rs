use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use std::time::Duration;

/// Connection settings for one Node-RED instance
#[derive(Debug, Clone)]
pub struct NodeRedConfig {
    /// Admin API root, e.g. `http://localhost:1880`
    pub url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request network timeout
    pub timeout: Duration,
}

impl Default for NodeRedConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:1880".to_string(),
            token: None,
            username: None,
            password: None,
            timeout: Duration::from_secs(30), // Node-RED deploys can be slow
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NodeRedConfig {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            token: non_empty(token),
            username: non_empty(username),
            password: non_empty(password),
            timeout,
        }
    }

    /// Reject settings that cannot work and warn about ambiguous ones
    pub fn check(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "Node-RED URL must start with http:// or https://, got {}",
                self.url
            )));
        }
        match (&self.username, &self.password) {
            (Some(_), None) => {
                tracing::warn!("NODE_RED_USERNAME is set without NODE_RED_PASSWORD; token refresh will fail")
            }
            (None, Some(_)) => {
                tracing::warn!("NODE_RED_PASSWORD is set without NODE_RED_USERNAME; it is ignored")
            }
            _ => {}
        }
        if self.username.is_some() && self.token.is_some() {
            tracing::warn!("Both a static token and a username are configured; using password login");
        }
        Ok(())
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            base_url: self.url.clone(),
            token: self.token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Shared HTTP client with the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("nodered-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_and_blank_values() {
        let config = NodeRedConfig::new(
            "http://nodered.local:1880//",
            Some("  ".to_string()),
            Some("admin".to_string()),
            Some("secret".to_string()),
            Duration::from_secs(5),
        );
        assert_eq!(config.url, "http://nodered.local:1880");
        assert!(config.token.is_none());
        assert_eq!(config.auth_config().username.as_deref(), Some("admin"));
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = NodeRedConfig::new("nodered:1880", None, None, None, Duration::from_secs(5));
        assert!(matches!(config.check(), Err(Error::Configuration(_))));
    }
}
