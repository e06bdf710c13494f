use super::methods::RuntimeMethod;
use super::types::{condense_node_sets, InjectParams, ListNodesParams, SetStateParams};
use crate::hub::{parse_params, Activation, HubError, MethodSchema, NoParams, ToolOutput};
use crate::nodered::NodeRedClient;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Flow runtime control
#[derive(Clone)]
pub struct Runtime {
    client: Arc<NodeRedClient>,
}

impl Runtime {
    pub fn new(client: Arc<NodeRedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Activation for Runtime {
    fn namespace(&self) -> &str {
        "runtime"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Node-RED runtime state, inject triggers and installed nodes"
    }

    fn methods(&self) -> Vec<MethodSchema> {
        RuntimeMethod::ALL.iter().map(RuntimeMethod::schema).collect()
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolOutput, HubError> {
        let Some(method) = RuntimeMethod::from_name(method) else {
            return Err(HubError::MethodNotFound {
                activation: "runtime".to_string(),
                method: method.to_string(),
            });
        };

        match method {
            RuntimeMethod::GetState => {
                let _: NoParams = parse_params(params)?;
                ToolOutput::data(&self.client.get_flows_state().await?)
            }
            RuntimeMethod::SetState => {
                let p: SetStateParams = parse_params(params)?;
                let response = self.client.set_flows_state(p.state).await?;
                tracing::info!(state = p.state.as_str(), "Set flow state");
                ToolOutput::data(&response)
            }
            RuntimeMethod::Inject => {
                let p: InjectParams = parse_params(params)?;
                self.client.inject(&p.node_id).await?;
                Ok(ToolOutput::text(format!("Injected {}", p.node_id)))
            }
            RuntimeMethod::ListNodes => {
                let p: ListNodesParams = parse_params(params)?;
                let node_sets = self.client.get_nodes().await?;
                ToolOutput::data(&condense_node_sets(&node_sets, p.module.as_deref()))
            }
        }
    }
}
