pub mod activations;
pub mod auth;
pub mod builder;
pub mod config;
pub mod error;
pub mod flows;
pub mod hub;
pub mod layout;
pub mod mcp_bridge;
pub mod nodered;

// Re-export commonly used items
pub use builder::build_hub;
pub use config::NodeRedConfig;
pub use error::{Error, Result};
pub use mcp_bridge::NodeRedMcpBridge;
