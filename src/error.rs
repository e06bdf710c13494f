//! Crate-level error type

use crate::auth::AuthError;

/// Errors surfaced by the Node-RED client and the flow tools
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or inconsistent configuration for the requested auth mode
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Non-2xx from any Node-RED endpoint other than `/auth/token`
    #[error("Node-RED API error: {method} {path} returned HTTP {status}: {body}")]
    UpstreamApi {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// Connection failure, timeout, or other transport problem
    #[error("request {method} {path} failed: {reason}")]
    Transport {
        method: String,
        path: String,
        reason: String,
    },

    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("flow not found: {query} (available: {available})")]
    FlowNotFound { query: String, available: String },
}

pub type Result<T> = std::result::Result<T, Error>;
