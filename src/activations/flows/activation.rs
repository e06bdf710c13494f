use super::methods::FlowsMethod;
use super::types::{
    AddNodesParams, CreateFlowParams, DeployParams, FlowRefParams, UpdateFlowParams,
    ValidateParams,
};
use crate::flows::{
    validate_nodes, EditOutcome, FlowEdit, FlowEditor, MergeMode, ValidationReport,
    ValidationStage,
};
use crate::hub::{parse_params, Activation, HubError, MethodSchema, NoParams, ToolOutput};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ValidationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<ValidationStage>,
    #[serde(flatten)]
    report: ValidationReport,
}

/// Flow tab tools
#[derive(Clone)]
pub struct Flows {
    editor: Arc<FlowEditor>,
}

impl Flows {
    pub fn new(editor: Arc<FlowEditor>) -> Self {
        Self { editor }
    }

    async fn deploy(&self, params: DeployParams) -> Result<ToolOutput, HubError> {
        let client = self.editor.client();
        let flows = match params.flows {
            Some(flows) => {
                let report = validate_nodes(&flows, &HashSet::new());
                if !report.valid {
                    return Ok(ToolOutput::failure(format!(
                        "Deploy rejected, nothing was written.\n{}",
                        report.summary()
                    )));
                }
                Value::Array(flows)
            }
            None => client.get_flows().await?,
        };

        let count = flows.as_array().map_or(0, Vec::len);
        let response = client.deploy_flows(&flows, params.deployment_type).await?;
        tracing::info!(nodes = count, deployment = params.deployment_type.as_str(), "Deployed flows");

        ToolOutput::data(&json!({
            "deployed": count,
            "deployment_type": params.deployment_type,
            "response": response,
        }))
    }
}

fn edit_output(outcome: EditOutcome) -> Result<ToolOutput, HubError> {
    match outcome {
        EditOutcome::Applied(report) => ToolOutput::data(&report),
        EditOutcome::Rejected { stage, report } => Ok(ToolOutput::failure(format!(
            "Rejected at {} validation, nothing was written.\n{}",
            stage.as_str(),
            report.summary()
        ))),
    }
}

#[async_trait]
impl Activation for Flows {
    fn namespace(&self) -> &str {
        "flows"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Read, edit, validate and deploy Node-RED flow tabs"
    }

    fn methods(&self) -> Vec<MethodSchema> {
        FlowsMethod::ALL.iter().map(FlowsMethod::schema).collect()
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolOutput, HubError> {
        let Some(method) = FlowsMethod::from_name(method) else {
            return Err(HubError::MethodNotFound {
                activation: "flows".to_string(),
                method: method.to_string(),
            });
        };
        let client = self.editor.client();

        match method {
            FlowsMethod::ListTabs => {
                let _: NoParams = parse_params(params)?;
                ToolOutput::data(&client.list_tabs().await?)
            }
            FlowsMethod::GetAll => {
                let _: NoParams = parse_params(params)?;
                ToolOutput::data(&client.get_flows().await?)
            }
            FlowsMethod::Get => {
                let p: FlowRefParams = parse_params(params)?;
                let id = client.resolve_flow_id(&p.flow).await?;
                ToolOutput::data(&client.get_flow(&id).await?)
            }
            FlowsMethod::Create => {
                let p: CreateFlowParams = parse_params(params)?;
                let outcome = self
                    .editor
                    .create(&p.label, p.info.as_deref(), p.nodes, p.layout)
                    .await?;
                edit_output(outcome)
            }
            FlowsMethod::Update => {
                let p: UpdateFlowParams = parse_params(params)?;
                let outcome = self
                    .editor
                    .apply(FlowEdit {
                        flow: p.flow,
                        nodes: p.nodes,
                        mode: p.mode,
                        preserve_coordinates: p.preserve_coordinates,
                        strategy: p.layout,
                    })
                    .await?;
                edit_output(outcome)
            }
            FlowsMethod::AddNodes => {
                let p: AddNodesParams = parse_params(params)?;
                let outcome = self
                    .editor
                    .apply(FlowEdit {
                        flow: p.flow,
                        nodes: p.nodes,
                        mode: MergeMode::AddOnly,
                        preserve_coordinates: true,
                        strategy: p.layout,
                    })
                    .await?;
                edit_output(outcome)
            }
            FlowsMethod::Validate => {
                let p: ValidateParams = parse_params(params)?;
                let response = match p.flow {
                    Some(flow) => {
                        let (stage, report) = self.editor.validate(&flow, p.nodes, p.mode).await?;
                        ValidationResponse {
                            stage: Some(stage),
                            report,
                        }
                    }
                    None => ValidationResponse {
                        stage: None,
                        report: validate_nodes(&p.nodes, &HashSet::new()),
                    },
                };
                ToolOutput::data(&response)
            }
            FlowsMethod::Delete => {
                let p: FlowRefParams = parse_params(params)?;
                let id = client.resolve_flow_id(&p.flow).await?;
                client.delete_flow(&id).await?;
                tracing::info!(flow = %id, "Deleted flow");
                Ok(ToolOutput::text(format!("Deleted flow {}", id)))
            }
            FlowsMethod::Deploy => {
                let p: DeployParams = parse_params(params)?;
                self.deploy(p).await
            }
        }
    }
}
