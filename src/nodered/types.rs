use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Value of the `Node-RED-Deployment-Type` header on `POST /flows`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentType {
    /// Restart every node
    #[default]
    Full,
    /// Restart only modified nodes
    Nodes,
    /// Restart only flows containing modified nodes
    Flows,
    /// Reload flows from storage and restart all nodes
    Reload,
}

impl DeploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Full => "full",
            DeploymentType::Nodes => "nodes",
            DeploymentType::Flows => "flows",
            DeploymentType::Reload => "reload",
        }
    }
}

/// Runtime flow state accepted by `POST /flows/state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Start,
    Stop,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Start => "start",
            FlowState::Stop => "stop",
        }
    }
}

/// A flow tab as listed in `GET /flows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSummary {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
}
