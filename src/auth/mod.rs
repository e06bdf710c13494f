//! Bearer token lifecycle for the Node-RED admin API
//!
//! One [`TokenAuthManager`] per upstream instance. It moves between
//! `NoCredential`, `Valid` and `Expired`:
//!
//! - construction and [`TokenAuthManager::invalidate`] lead to `NoCredential`
//! - a successful password grant leads to `Valid`
//! - crossing `expires_at - 60s` leads to `Expired`, and the next header
//!   request refreshes

mod manager;
mod types;

pub use manager::{AuthConfig, Clock, SystemClock, TokenAuthManager};
pub use types::{
    AuthError, AuthStatus, Credential, PasswordGrant, TokenResponse, TokenSource, CLIENT_ID,
    DEFAULT_TOKEN_TYPE, EXPIRY_BUFFER_MS,
};
