//! Method definitions for the Runtime activation

use super::types::{InjectParams, ListNodesParams, SetStateParams};
use crate::hub::{params_schema, MethodSchema, NoParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMethod {
    GetState,
    SetState,
    Inject,
    ListNodes,
}

impl RuntimeMethod {
    pub const ALL: [RuntimeMethod; 4] = [
        RuntimeMethod::GetState,
        RuntimeMethod::SetState,
        RuntimeMethod::Inject,
        RuntimeMethod::ListNodes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuntimeMethod::GetState => "get_state",
            RuntimeMethod::SetState => "set_state",
            RuntimeMethod::Inject => "inject",
            RuntimeMethod::ListNodes => "list_nodes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuntimeMethod::GetState => "Get whether flows are started or stopped",
            RuntimeMethod::SetState => "Start or stop all flows",
            RuntimeMethod::Inject => "Trigger an inject node",
            RuntimeMethod::ListNodes => {
                "List installed node modules with their version and node types"
            }
        }
    }

    pub fn schema(&self) -> MethodSchema {
        let params = match self {
            RuntimeMethod::GetState => params_schema::<NoParams>(),
            RuntimeMethod::SetState => params_schema::<SetStateParams>(),
            RuntimeMethod::Inject => params_schema::<InjectParams>(),
            RuntimeMethod::ListNodes => params_schema::<ListNodesParams>(),
        };
        MethodSchema::new(self.name(), self.description(), params)
    }
}
