use crate::flows::MergeMode;
use crate::layout::LayoutStrategy;
use crate::nodered::DeploymentType;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FlowRefParams {
    /// Flow tab id or label
    pub flow: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateFlowParams {
    /// Tab label
    pub label: String,
    /// Tab description
    #[serde(default)]
    pub info: Option<String>,
    /// Nodes to place on the new tab; ids are generated when missing
    #[serde(default)]
    pub nodes: Vec<Value>,
    /// Placement strategy for nodes without coordinates
    #[serde(default)]
    pub layout: LayoutStrategy,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateFlowParams {
    /// Flow tab id or label
    pub flow: String,
    /// Incoming nodes
    pub nodes: Vec<Value>,
    /// How incoming nodes are reconciled with the current ones
    #[serde(default)]
    pub mode: MergeMode,
    /// Keep the current x/y of nodes that already exist
    #[serde(default = "default_true")]
    pub preserve_coordinates: bool,
    /// Placement strategy for added nodes
    #[serde(default)]
    pub layout: LayoutStrategy,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddNodesParams {
    /// Flow tab id or label
    pub flow: String,
    /// Nodes to add; ids already on the tab are skipped
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub layout: LayoutStrategy,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateParams {
    /// Flow tab to merge into; omit to check the nodes on their own
    #[serde(default)]
    pub flow: Option<String>,
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub mode: MergeMode,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeployParams {
    /// Complete flow configuration; omit to redeploy the current one
    #[serde(default)]
    pub flows: Option<Vec<Value>>,
    #[serde(default)]
    pub deployment_type: DeploymentType,
}
