use super::merge::{merge_nodes, node_id, MergeMode};
use super::validation::{validate_nodes, ValidationReport};
use crate::error::Result;
use crate::layout::{LayoutEngine, LayoutNode, LayoutStats, LayoutStrategy, PlacedNode, Point};
use crate::nodered::NodeRedClient;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A batch of node changes aimed at one flow tab
#[derive(Debug, Clone)]
pub struct FlowEdit {
    /// Flow id or label
    pub flow: String,
    pub nodes: Vec<Value>,
    pub mode: MergeMode,
    pub preserve_coordinates: bool,
    pub strategy: LayoutStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    /// The submitted nodes, before merging
    Incoming,
    /// The flow as it would be written
    Merged,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::Incoming => "incoming",
            ValidationStage::Merged => "merged",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EditReport {
    pub flow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MergeMode>,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub removed: Vec<String>,
    pub total_nodes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<PlacedNode>,
}

/// Result of an edit: written, or refused with the full list of problems
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Applied(EditReport),
    Rejected {
        stage: ValidationStage,
        report: ValidationReport,
    },
}

/// Fetch, validate, merge, lay out and write back flow tabs
pub struct FlowEditor {
    client: Arc<NodeRedClient>,
    layout: LayoutEngine,
}

impl FlowEditor {
    pub fn new(client: Arc<NodeRedClient>, layout: LayoutEngine) -> Self {
        Self { client, layout }
    }

    pub fn client(&self) -> &Arc<NodeRedClient> {
        &self.client
    }

    /// Apply `edit` to the current upstream state of its flow.
    ///
    /// The flow is re-fetched on every call so concurrent editors of the
    /// same instance are overwritten as little as possible.
    pub async fn apply(&self, edit: FlowEdit) -> Result<EditOutcome> {
        let flow_id = self.client.resolve_flow_id(&edit.flow).await?;
        let mut flow = self.client.get_flow(&flow_id).await?;
        let existing = flow_nodes(&flow);

        let mut incoming = edit.nodes;
        prepare_nodes(&mut incoming, Some(&flow_id));
        if edit.mode == MergeMode::Merge {
            inherit_types(&mut incoming, &existing);
        }

        let external = match edit.mode {
            MergeMode::Replace => HashSet::new(),
            MergeMode::Merge | MergeMode::AddOnly => ids_of(&existing),
        };
        let report = validate_nodes(&incoming, &external);
        if !report.valid {
            return Ok(EditOutcome::Rejected {
                stage: ValidationStage::Incoming,
                report,
            });
        }

        let mut merged = merge_nodes(&existing, incoming, edit.mode, edit.preserve_coordinates);

        let pending: HashSet<String> = match edit.mode {
            MergeMode::Replace => merged
                .nodes
                .iter()
                .filter(|n| point_of(n).is_none())
                .filter_map(|n| node_id(n).map(str::to_string))
                .collect(),
            MergeMode::Merge | MergeMode::AddOnly => merged.added.iter().cloned().collect(),
        };
        let placed = self.place(&mut merged.nodes, &pending, edit.strategy);

        let report = validate_nodes(&merged.nodes, &HashSet::new());
        if !report.valid {
            return Ok(EditOutcome::Rejected {
                stage: ValidationStage::Merged,
                report,
            });
        }

        let total_nodes = merged.nodes.len();
        if let Some(fields) = flow.as_object_mut() {
            fields.insert("id".to_string(), json!(flow_id));
            fields.insert("nodes".to_string(), Value::Array(merged.nodes));
        }
        self.client.update_flow(&flow_id, &flow).await?;

        tracing::info!(
            flow = %flow_id,
            mode = ?edit.mode,
            added = merged.added.len(),
            updated = merged.updated.len(),
            skipped = merged.skipped.len(),
            "Updated flow"
        );

        let (layout, positions) = split(placed);
        Ok(EditOutcome::Applied(EditReport {
            flow_id,
            mode: Some(edit.mode),
            added: merged.added,
            updated: merged.updated,
            skipped: merged.skipped,
            removed: merged.removed,
            total_nodes,
            layout,
            positions,
        }))
    }

    /// Create a new tab holding `nodes`, laying out any without coordinates
    pub async fn create(
        &self,
        label: &str,
        info: Option<&str>,
        nodes: Vec<Value>,
        strategy: LayoutStrategy,
    ) -> Result<EditOutcome> {
        let mut nodes = nodes;
        prepare_nodes(&mut nodes, None);

        let report = validate_nodes(&nodes, &HashSet::new());
        if !report.valid {
            return Ok(EditOutcome::Rejected {
                stage: ValidationStage::Incoming,
                report,
            });
        }

        let pending: HashSet<String> = nodes
            .iter()
            .filter(|n| point_of(n).is_none())
            .filter_map(|n| node_id(n).map(str::to_string))
            .collect();
        let placed = self.place(&mut nodes, &pending, strategy);

        let added: Vec<String> = nodes
            .iter()
            .filter_map(|n| node_id(n).map(str::to_string))
            .collect();
        let total_nodes = nodes.len();
        let body = json!({
            "label": label,
            "info": info.unwrap_or_default(),
            "nodes": nodes,
            "configs": [],
        });
        let flow_id = self.client.create_flow(&body).await?;
        tracing::info!(flow = %flow_id, label = %label, nodes = total_nodes, "Created flow");

        let (layout, positions) = split(placed);
        Ok(EditOutcome::Applied(EditReport {
            flow_id,
            mode: None,
            added,
            updated: Vec::new(),
            skipped: Vec::new(),
            removed: Vec::new(),
            total_nodes,
            layout,
            positions,
        }))
    }

    /// Run both validation stages of [`FlowEditor::apply`] without writing
    pub async fn validate(
        &self,
        flow: &str,
        nodes: Vec<Value>,
        mode: MergeMode,
    ) -> Result<(ValidationStage, ValidationReport)> {
        let flow_id = self.client.resolve_flow_id(flow).await?;
        let existing = flow_nodes(&self.client.get_flow(&flow_id).await?);

        let mut incoming = nodes;
        prepare_nodes(&mut incoming, Some(&flow_id));
        if mode == MergeMode::Merge {
            inherit_types(&mut incoming, &existing);
        }

        let external = match mode {
            MergeMode::Replace => HashSet::new(),
            MergeMode::Merge | MergeMode::AddOnly => ids_of(&existing),
        };
        let report = validate_nodes(&incoming, &external);
        if !report.valid {
            return Ok((ValidationStage::Incoming, report));
        }

        let merged = merge_nodes(&existing, incoming, mode, true);
        Ok((ValidationStage::Merged, validate_nodes(&merged.nodes, &HashSet::new())))
    }

    /// Position every node whose id is in `pending`, treating the rest as
    /// the existing canvas
    fn place(
        &self,
        nodes: &mut [Value],
        pending: &HashSet<String>,
        strategy: LayoutStrategy,
    ) -> Option<(LayoutStats, Vec<PlacedNode>)> {
        if pending.is_empty() {
            return None;
        }

        let is_pending = |n: &Value| node_id(n).is_some_and(|id| pending.contains(id));
        let existing: Vec<Point> = nodes
            .iter()
            .filter(|n| !is_pending(*n))
            .filter_map(point_of)
            .collect();
        let batch: Vec<LayoutNode> = nodes
            .iter()
            .filter(|n| is_pending(*n))
            .map(layout_node_of)
            .collect();

        let result = self.layout.layout(&existing, &batch, strategy);

        let positions: HashMap<&str, &PlacedNode> = result
            .positions
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect();
        for node in nodes.iter_mut() {
            let target = node_id(node).and_then(|id| positions.get(id)).map(|p| (p.x, p.y));
            if let (Some((x, y)), Some(fields)) = (target, node.as_object_mut()) {
                fields.insert("x".to_string(), json!(x));
                fields.insert("y".to_string(), json!(y));
            }
        }

        Some((result.stats, result.positions))
    }
}

fn split(placed: Option<(LayoutStats, Vec<PlacedNode>)>) -> (Option<LayoutStats>, Vec<PlacedNode>) {
    match placed {
        Some((stats, positions)) => (Some(stats), positions),
        None => (None, Vec::new()),
    }
}

fn flow_nodes(flow: &Value) -> Vec<Value> {
    flow.get("nodes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn ids_of(nodes: &[Value]) -> HashSet<String> {
    nodes
        .iter()
        .filter_map(|n| node_id(n).map(str::to_string))
        .collect()
}

/// Canvas position of a node, if it has numeric coordinates
pub fn point_of(node: &Value) -> Option<Point> {
    let x = node.get("x")?.as_f64()?;
    let y = node.get("y")?.as_f64()?;
    Some(Point::from_f64(x, y))
}

pub fn layout_node_of(node: &Value) -> LayoutNode {
    let wires = node
        .get("wires")
        .and_then(Value::as_array)
        .map(|outputs| {
            outputs
                .iter()
                .map(|targets| {
                    targets
                        .as_array()
                        .map(|t| t.iter().filter_map(Value::as_str).map(str::to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    LayoutNode {
        id: node_id(node).unwrap_or_default().to_string(),
        node_type: node
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        wires,
    }
}

/// 16 hex digits, the shape of ids the Node-RED editor generates
pub fn generate_node_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

/// Give id-less nodes a fresh id and pin them to `flow_id`
fn prepare_nodes(nodes: &mut [Value], flow_id: Option<&str>) {
    for node in nodes.iter_mut() {
        let Some(fields) = node.as_object_mut() else {
            continue;
        };
        if !fields.contains_key("id") {
            fields.insert("id".to_string(), json!(generate_node_id()));
        }
        if let Some(flow_id) = flow_id {
            fields.insert("z".to_string(), json!(flow_id));
        }
    }
}

/// Patches for existing nodes may omit `type`; the merge keeps the current one
fn inherit_types(incoming: &mut [Value], existing: &[Value]) {
    let types: HashMap<&str, &Value> = existing
        .iter()
        .filter_map(|n| Some((node_id(n)?, n.get("type")?)))
        .collect();
    for node in incoming.iter_mut() {
        let inherited = node_id(node).and_then(|id| types.get(id)).map(|t| (*t).clone());
        if let (Some(node_type), Some(fields)) = (inherited, node.as_object_mut()) {
            fields.entry("type").or_insert(node_type);
        }
    }
}
