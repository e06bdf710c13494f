//! Method definitions for the Flows activation

use super::types::{
    AddNodesParams, CreateFlowParams, DeployParams, FlowRefParams, UpdateFlowParams,
    ValidateParams,
};
use crate::hub::{params_schema, MethodSchema, NoParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowsMethod {
    ListTabs,
    GetAll,
    Get,
    Create,
    Update,
    AddNodes,
    Validate,
    Delete,
    Deploy,
}

impl FlowsMethod {
    pub const ALL: [FlowsMethod; 9] = [
        FlowsMethod::ListTabs,
        FlowsMethod::GetAll,
        FlowsMethod::Get,
        FlowsMethod::Create,
        FlowsMethod::Update,
        FlowsMethod::AddNodes,
        FlowsMethod::Validate,
        FlowsMethod::Delete,
        FlowsMethod::Deploy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FlowsMethod::ListTabs => "list_tabs",
            FlowsMethod::GetAll => "get_all",
            FlowsMethod::Get => "get",
            FlowsMethod::Create => "create",
            FlowsMethod::Update => "update",
            FlowsMethod::AddNodes => "add_nodes",
            FlowsMethod::Validate => "validate",
            FlowsMethod::Delete => "delete",
            FlowsMethod::Deploy => "deploy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlowsMethod::ListTabs => "List flow tabs with their id, label, disabled flag and info",
            FlowsMethod::GetAll => "Get the complete flow configuration of the instance",
            FlowsMethod::Get => "Get one flow tab and its nodes by id or label",
            FlowsMethod::Create => {
                "Create a flow tab; nodes without coordinates are laid out automatically"
            }
            FlowsMethod::Update => {
                "Merge nodes into a flow tab (replace, merge or add-only), validating before and after and laying out new nodes"
            }
            FlowsMethod::AddNodes => {
                "Add nodes to a flow tab without touching existing ones; returns placement statistics"
            }
            FlowsMethod::Validate => {
                "Check a node-set for structural problems without writing anything"
            }
            FlowsMethod::Delete => "Delete a flow tab by id or label",
            FlowsMethod::Deploy => "Deploy a complete flow configuration",
        }
    }

    pub fn schema(&self) -> MethodSchema {
        let params = match self {
            FlowsMethod::ListTabs | FlowsMethod::GetAll => params_schema::<NoParams>(),
            FlowsMethod::Get | FlowsMethod::Delete => params_schema::<FlowRefParams>(),
            FlowsMethod::Create => params_schema::<CreateFlowParams>(),
            FlowsMethod::Update => params_schema::<UpdateFlowParams>(),
            FlowsMethod::AddNodes => params_schema::<AddNodesParams>(),
            FlowsMethod::Validate => params_schema::<ValidateParams>(),
            FlowsMethod::Deploy => params_schema::<DeployParams>(),
        };
        MethodSchema::new(self.name(), self.description(), params)
    }
}
