use crate::nodered::FlowState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetStateParams {
    pub state: FlowState,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InjectParams {
    /// Id of an inject node
    pub node_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListNodesParams {
    /// Only modules whose name contains this text
    #[serde(default)]
    pub module: Option<String>,
}

/// One installed node module, condensed from its node sets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// True when any of the module's node sets is enabled
    pub enabled: bool,
    pub types: Vec<String>,
}

/// Group the node sets of `GET /nodes` by module, keeping first-seen order
pub fn condense_node_sets(node_sets: &Value, filter: Option<&str>) -> Vec<ModuleSummary> {
    let mut modules: Vec<ModuleSummary> = Vec::new();
    let filter = filter.map(str::to_lowercase);

    for set in node_sets.as_array().into_iter().flatten() {
        let Some(module) = set.get("module").and_then(Value::as_str) else {
            continue;
        };
        if let Some(filter) = &filter {
            if !module.to_lowercase().contains(filter.as_str()) {
                continue;
            }
        }

        let enabled = set.get("enabled").and_then(Value::as_bool).unwrap_or(true);
        let types = set
            .get("types")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string);

        let index = match modules.iter().position(|m| m.module == module) {
            Some(index) => index,
            None => {
                modules.push(ModuleSummary {
                    module: module.to_string(),
                    version: set.get("version").and_then(Value::as_str).map(str::to_string),
                    enabled: false,
                    types: Vec::new(),
                });
                modules.len() - 1
            }
        };
        let summary = &mut modules[index];
        summary.enabled |= enabled;
        summary.types.extend(types);
    }

    modules
}
