use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth client id Node-RED's admin API expects for password grants
pub const CLIENT_ID: &str = "node-red-admin";

/// Refresh this long before the upstream expiry
pub const EXPIRY_BUFFER_MS: i64 = 60_000;

/// Token type used when the token endpoint omits one
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

// ============================================================================
// Credential
// ============================================================================

/// A bearer credential obtained from a password grant.
///
/// Replaced wholesale on refresh. `expires_at > obtained_at` always holds for
/// credentials built through [`Credential::from_grant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    #[serde(skip_serializing)]
    pub token: String,
    pub token_type: String,
    /// Milliseconds since the unix epoch
    pub obtained_at: i64,
    /// Milliseconds since the unix epoch
    pub expires_at: i64,
}

impl Credential {
    /// Build a credential from a token endpoint response received at `now_ms`
    pub fn from_grant(grant: TokenResponse, now_ms: i64) -> Result<Self, AuthError> {
        if grant.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }
        if grant.expires_in <= 0 {
            return Err(AuthError::InvalidResponse(format!(
                "token endpoint returned non-positive expires_in: {}",
                grant.expires_in
            )));
        }

        let token_type = grant
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

        Ok(Self {
            token: grant.access_token,
            token_type,
            obtained_at: now_ms,
            expires_at: now_ms.saturating_add(grant.expires_in.saturating_mul(1000)),
        })
    }

    /// True while `now_ms` is before the buffered expiry
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at - EXPIRY_BUFFER_MS
    }
}

/// Body returned by `POST /auth/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body sent to `POST /auth/token`
#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrant<'a> {
    pub client_id: &'a str,
    pub grant_type: &'a str,
    pub scope: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> PasswordGrant<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self {
            client_id: CLIENT_ID,
            grant_type: "password",
            scope: "*",
            username,
            password,
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Where the bearer token comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Pre-shared token, managed outside this process
    Static,
    /// Obtained and refreshed through the password grant
    Dynamic,
    /// Anonymous upstream
    None,
}

/// Read-only snapshot of the credential cache
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub has_token: bool,
    pub is_valid: bool,
    pub source: TokenSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obtained_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Errors
// ============================================================================

/// Failures talking to the token endpoint
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("authentication failed: invalid username or password")]
    InvalidCredentials,

    #[error("authentication endpoint not found at {url}: admin auth is not enabled on this Node-RED instance")]
    AuthNotEnabled { url: String },

    #[error("authentication request failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("cannot reach Node-RED at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}
