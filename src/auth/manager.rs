use super::types::{
    AuthError, AuthStatus, Credential, PasswordGrant, TokenResponse, TokenSource,
    DEFAULT_TOKEN_TYPE,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;

/// Source of wall-clock time in milliseconds since the unix epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Credentials for one upstream Node-RED instance
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Admin API root without a trailing slash
    pub base_url: String,
    /// Pre-shared bearer token
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Owns the single cached bearer credential for an upstream instance.
///
/// The cache lock is never held across an await. Two callers that both see
/// an expired credential will both refresh; the later write wins, which is
/// harmless because both tokens were validly issued.
pub struct TokenAuthManager {
    config: AuthConfig,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    cached: RwLock<Option<Credential>>,
}

impl TokenAuthManager {
    pub fn new(config: AuthConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            clock: Arc::new(SystemClock),
            cached: RwLock::new(None),
        }
    }

    /// Replace the clock (tests drive expiry with a manual clock)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> TokenSource {
        if has_value(&self.config.username) {
            TokenSource::Dynamic
        } else if has_value(&self.config.token) {
            TokenSource::Static
        } else {
            TokenSource::None
        }
    }

    /// True iff a cached credential exists and has not crossed the buffered expiry
    pub fn is_valid(&self) -> bool {
        let now = self.clock.now_ms();
        self.cached
            .read()
            .as_ref()
            .is_some_and(|credential| credential.is_fresh(now))
    }

    /// Exchange username/password for a new credential and cache it
    pub async fn refresh(&self) -> Result<Credential> {
        let (username, password) = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) if !username.is_empty() => (username, password),
            _ => {
                return Err(Error::Configuration(
                    "username and password are required to request an admin token".to_string(),
                ))
            }
        };

        let url = format!("{}/auth/token", self.config.base_url);
        tracing::debug!(url = %url, username = %username, "Requesting admin token");

        let response = self
            .http
            .post(&url)
            .json(&PasswordGrant::new(username, password))
            .send()
            .await
            .map_err(|e| AuthError::Unreachable {
                url: self.config.base_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match status.as_u16() {
                401 => AuthError::InvalidCredentials,
                404 => AuthError::AuthNotEnabled { url },
                code => AuthError::Http { status: code, body },
            };
            tracing::warn!("Token request rejected: {}", error);
            return Err(error.into());
        }

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        Ok(self.install(grant)?)
    }

    /// Cache the credential built from a successful grant
    fn install(&self, grant: TokenResponse) -> std::result::Result<Credential, AuthError> {
        let credential = Credential::from_grant(grant, self.clock.now_ms())?;
        tracing::info!(
            expires_at = %format_ms(credential.expires_at),
            "Obtained Node-RED admin token"
        );
        *self.cached.write() = Some(credential.clone());
        Ok(credential)
    }

    /// Current token, refreshing when the cached one is missing or stale.
    ///
    /// Returns `None` for an anonymous upstream.
    pub async fn get_valid_token(&self) -> Result<Option<String>> {
        Ok(self.authorization().await?.map(|(_, token)| token))
    }

    async fn authorization(&self) -> Result<Option<(String, String)>> {
        match self.source() {
            TokenSource::None => Ok(None),
            TokenSource::Static => Ok(self
                .config
                .token
                .clone()
                .map(|token| (DEFAULT_TOKEN_TYPE.to_string(), token))),
            TokenSource::Dynamic => {
                let now = self.clock.now_ms();
                let cached = self
                    .cached
                    .read()
                    .as_ref()
                    .filter(|credential| credential.is_fresh(now))
                    .cloned();
                let credential = match cached {
                    Some(credential) => credential,
                    None => self.refresh().await?,
                };
                Ok(Some((credential.token_type, credential.token)))
            }
        }
    }

    /// Headers to attach to an outbound admin API call (empty when anonymous)
    pub async fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some((token_type, token)) = self.authorization().await? {
            let mut value = HeaderValue::from_str(&format!("{} {}", token_type, token))
                .map_err(|_| {
                    Error::Configuration(
                        "token contains characters that are not valid in an HTTP header"
                            .to_string(),
                    )
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Drop the cached credential so the next call refreshes
    pub fn invalidate(&self) {
        if self.cached.write().take().is_some() {
            tracing::debug!("Invalidated cached admin token");
        }
    }

    pub fn status(&self) -> AuthStatus {
        let source = self.source();
        let cached = self.cached.read().clone();
        match source {
            TokenSource::Static => AuthStatus {
                has_token: true,
                is_valid: true,
                source,
                expires_at: None,
                obtained_at: None,
            },
            TokenSource::Dynamic => AuthStatus {
                has_token: cached.is_some(),
                is_valid: cached
                    .as_ref()
                    .is_some_and(|credential| credential.is_fresh(self.clock.now_ms())),
                source,
                expires_at: cached.as_ref().and_then(|c| to_datetime(c.expires_at)),
                obtained_at: cached.as_ref().and_then(|c| to_datetime(c.obtained_at)),
            },
            TokenSource::None => AuthStatus {
                has_token: false,
                is_valid: false,
                source,
                expires_at: None,
                obtained_at: None,
            },
        }
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn format_ms(ms: i64) -> String {
    to_datetime(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
