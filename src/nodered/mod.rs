//! Node-RED admin API client

mod client;
mod types;

pub use client::NodeRedClient;
pub use types::{DeploymentType, FlowState, TabSummary};
