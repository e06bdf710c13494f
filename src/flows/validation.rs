use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Every structural problem found in a node-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub node_count: usize,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// One message per line, for tool output
    pub fn summary(&self) -> String {
        if self.valid {
            return format!("{} nodes valid", self.node_count);
        }
        let mut out = format!(
            "{} validation error(s) in {} nodes:",
            self.errors.len(),
            self.node_count
        );
        for error in &self.errors {
            out.push_str("\n- ");
            out.push_str(error);
        }
        out
    }
}

fn label(index: usize, node: &Value) -> String {
    match node.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => format!("node[{}] \"{}\"", index, id),
        _ => format!("node[{}]", index),
    }
}

/// Check a node-set without failing fast.
///
/// `external_ids` are ids that exist outside this set (for instance the
/// current contents of the target flow) and may be used as wire targets.
pub fn validate_nodes(nodes: &[Value], external_ids: &HashSet<String>) -> ValidationReport {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    let known: HashSet<&str> = nodes
        .iter()
        .filter_map(|n| n.get("id").and_then(Value::as_str))
        .chain(external_ids.iter().map(String::as_str))
        .collect();

    for (index, node) in nodes.iter().enumerate() {
        let name = label(index, node);
        let Some(fields) = node.as_object() else {
            errors.push(format!("{} is not a JSON object", name));
            continue;
        };

        match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => {
                if !seen.insert(id.as_str()) {
                    errors.push(format!("{}: duplicate id", name));
                }
            }
            Some(Value::String(_)) | None => errors.push(format!("{}: missing id", name)),
            Some(_) => errors.push(format!("{}: id must be a string", name)),
        }

        match fields.get("type") {
            Some(Value::String(t)) if !t.is_empty() => {}
            Some(Value::String(_)) | None => errors.push(format!("{}: missing type", name)),
            Some(_) => errors.push(format!("{}: type must be a string", name)),
        }

        for axis in ["x", "y"] {
            if let Some(value) = fields.get(axis) {
                if !value.is_number() {
                    errors.push(format!("{}: {} must be a number, got {}", name, axis, value));
                }
            }
        }

        let Some(wires) = fields.get("wires") else {
            continue;
        };
        let Some(outputs) = wires.as_array() else {
            errors.push(format!("{}: wires must be an array of arrays", name));
            continue;
        };
        for (port, targets) in outputs.iter().enumerate() {
            let Some(targets) = targets.as_array() else {
                errors.push(format!("{}: wires[{}] must be an array", name, port));
                continue;
            };
            for target in targets {
                match target.as_str() {
                    Some(target) if known.contains(target) => {}
                    Some(target) => errors.push(format!(
                        "{}: output {} wires to unknown node \"{}\"",
                        name, port, target
                    )),
                    None => errors.push(format!(
                        "{}: wires[{}] contains non-string target {}",
                        name, port, target
                    )),
                }
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        node_count: nodes.len(),
        errors,
    }
}
