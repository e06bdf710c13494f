use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// How an incoming node-set is reconciled with a flow's current nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Discard the current nodes; the incoming set becomes the flow
    Replace,
    /// Overwrite fields of matching ids, append unseen ids
    #[default]
    Merge,
    /// Skip ids that already exist, append unseen ids
    AddOnly,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Final node list for the flow
    pub nodes: Vec<Value>,
    /// Ids that were not present before
    pub added: Vec<String>,
    /// Ids present before and overwritten
    pub updated: Vec<String>,
    /// Incoming ids ignored because they already existed (add-only)
    pub skipped: Vec<String>,
    /// Ids dropped by a replace
    pub removed: Vec<String>,
}

pub(crate) fn node_id(node: &Value) -> Option<&str> {
    node.get("id").and_then(Value::as_str)
}

fn coordinates(node: &Value) -> Option<(Value, Value)> {
    let x = node.get("x").filter(|v| v.is_number())?;
    let y = node.get("y").filter(|v| v.is_number())?;
    Some((x.clone(), y.clone()))
}

fn pin(node: &mut Value, (x, y): (Value, Value)) {
    if let Some(fields) = node.as_object_mut() {
        fields.insert("x".to_string(), x);
        fields.insert("y".to_string(), y);
    }
}

/// Reconcile `incoming` against `existing` under `mode`.
///
/// Existing order is kept; new nodes are appended in incoming order. With
/// `preserve_coordinates`, a node present on both sides keeps its current
/// `x`/`y`.
pub fn merge_nodes(
    existing: &[Value],
    incoming: Vec<Value>,
    mode: MergeMode,
    preserve_coordinates: bool,
) -> MergeOutcome {
    let current: HashMap<&str, &Value> = existing
        .iter()
        .filter_map(|n| node_id(n).map(|id| (id, n)))
        .collect();
    let mut outcome = MergeOutcome::default();

    match mode {
        MergeMode::Replace => {
            let incoming_ids: HashSet<String> = incoming
                .iter()
                .filter_map(|n| node_id(n).map(str::to_string))
                .collect();
            outcome.removed = existing
                .iter()
                .filter_map(node_id)
                .filter(|id| !incoming_ids.contains(*id))
                .map(str::to_string)
                .collect();

            for mut node in incoming {
                let id = node_id(&node).unwrap_or_default().to_string();
                match current.get(id.as_str()) {
                    Some(old) => {
                        if preserve_coordinates {
                            if let Some(xy) = coordinates(old) {
                                pin(&mut node, xy);
                            }
                        }
                        outcome.updated.push(id);
                    }
                    None => outcome.added.push(id),
                }
                outcome.nodes.push(node);
            }
        }

        MergeMode::Merge => {
            let mut patches: HashMap<String, Value> = HashMap::new();
            let mut appended = Vec::new();
            for node in incoming {
                let id = node_id(&node).unwrap_or_default().to_string();
                if current.contains_key(id.as_str()) {
                    patches.insert(id, node);
                } else {
                    outcome.added.push(id);
                    appended.push(node);
                }
            }

            for old in existing {
                let patch = node_id(old).and_then(|id| patches.remove(id));
                let Some(patch) = patch else {
                    outcome.nodes.push(old.clone());
                    continue;
                };

                let mut merged = old.clone();
                if let (Some(target), Value::Object(fields)) = (merged.as_object_mut(), patch) {
                    target.extend(fields);
                }
                if preserve_coordinates {
                    if let Some(xy) = coordinates(old) {
                        pin(&mut merged, xy);
                    }
                }
                if let Some(id) = node_id(&merged) {
                    outcome.updated.push(id.to_string());
                }
                outcome.nodes.push(merged);
            }
            outcome.nodes.extend(appended);
        }

        MergeMode::AddOnly => {
            outcome.nodes = existing.to_vec();
            for node in incoming {
                let id = node_id(&node).unwrap_or_default().to_string();
                if current.contains_key(id.as_str()) {
                    outcome.skipped.push(id);
                } else {
                    outcome.added.push(id);
                    outcome.nodes.push(node);
                }
            }
        }
    }

    outcome
}
