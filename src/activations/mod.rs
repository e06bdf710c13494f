//! Tool namespaces served over MCP
//!
//! - `auth`: credential introspection and refresh
//! - `flows`: flow tab CRUD, merge/layout edits, validation and deploy
//! - `runtime`: flow runtime state, inject triggers and installed nodes

pub mod auth;
pub mod flows;
pub mod runtime;
