use std::collections::{HashMap, VecDeque};

/// Node types that start a chain even when something wires into them
pub const TRIGGER_TYPES: &[&str] = &[
    "inject",
    "http in",
    "mqtt in",
    "websocket in",
    "tcp in",
    "udp in",
    "serial in",
    "link in",
    "catch",
    "status",
    "complete",
    "watch",
];

/// The parts of a node the layout engine looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode {
    pub id: String,
    pub node_type: String,
    /// One list of target ids per output port
    pub wires: Vec<Vec<String>>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            wires: Vec::new(),
        }
    }

    pub fn wired_to<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wires.push(targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_trigger(&self) -> bool {
        TRIGGER_TYPES.contains(&self.node_type.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("wires form a cycle through node {node}")]
    Cycle { node: String },
}

/// Edges among the nodes of one layout batch, by input index.
///
/// Wires pointing outside the batch and self-loops are ignored.
#[derive(Debug, Clone)]
pub struct ConnectionGraph {
    ids: Vec<String>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl ConnectionGraph {
    pub fn build(nodes: &[LayoutNode]) -> Self {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];

        for (source, node) in nodes.iter().enumerate() {
            for target in node.wires.iter().flatten() {
                let Some(&target) = index.get(target.as_str()) else {
                    continue;
                };
                if target == source || outgoing[source].contains(&target) {
                    continue;
                }
                outgoing[source].push(target);
                incoming[target].push(source);
            }
        }

        Self {
            ids: nodes.iter().map(|n| n.id.clone()).collect(),
            outgoing,
            incoming,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn has_edges(&self) -> bool {
        self.outgoing.iter().any(|targets| !targets.is_empty())
    }

    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    /// Nodes with no incoming edge, in input order
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.incoming[i].is_empty()).collect()
    }

    /// Longest-path layer of every node.
    ///
    /// A depth-first walk from the roots (or node 0 when every node has an
    /// incoming edge) drops the back edges that close feedback loops. Layers
    /// are then the longest path over the remaining edges. Nodes the walk
    /// never reaches get a trailing layer.
    pub fn layers(&self) -> Result<Vec<usize>, LayoutError> {
        let n = self.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut roots = self.roots();
        if roots.is_empty() {
            roots.push(0);
        }

        let forward = self.forward_edges(&roots);
        let reached: Vec<usize> = (0..n).filter(|&i| forward[i].is_some()).collect();

        let mut in_degree = vec![0usize; n];
        for targets in forward.iter().flatten() {
            for &target in targets {
                in_degree[target] += 1;
            }
        }

        let mut depth: Vec<Option<usize>> = vec![None; n];
        let mut queue: VecDeque<usize> = reached
            .iter()
            .copied()
            .filter(|&i| in_degree[i] == 0)
            .collect();
        for &start in &queue {
            depth[start] = Some(0);
        }

        let mut settled = 0;
        while let Some(node) = queue.pop_front() {
            settled += 1;
            let d = depth[node].unwrap_or(0);
            for &next in forward[node].iter().flatten() {
                depth[next] = Some(depth[next].map_or(d + 1, |current| current.max(d + 1)));
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if settled < reached.len() {
            let stuck = reached.iter().find(|&&i| in_degree[i] > 0).copied().unwrap_or(0);
            return Err(LayoutError::Cycle {
                node: self.ids[stuck].clone(),
            });
        }

        let trailing = depth.iter().flatten().max().map_or(0, |max| max + 1);
        Ok(depth.into_iter().map(|d| d.unwrap_or(trailing)).collect())
    }

    /// Outgoing edges of every node reachable from `roots`, minus the edges
    /// back onto the current walk path. `None` for unreachable nodes.
    fn forward_edges(&self, roots: &[usize]) -> Vec<Option<Vec<usize>>> {
        let n = self.len();
        let mut forward: Vec<Option<Vec<usize>>> = vec![None; n];
        let mut on_path = vec![false; n];

        for &root in roots {
            if forward[root].is_some() {
                continue;
            }
            forward[root] = Some(Vec::new());
            on_path[root] = true;
            let mut stack = vec![(root, 0usize)];

            while let Some((node, edge)) = stack.last_mut() {
                let node = *node;
                let Some(&next) = self.outgoing[node].get(*edge) else {
                    on_path[node] = false;
                    stack.pop();
                    continue;
                };
                *edge += 1;

                if on_path[next] {
                    tracing::trace!(from = %self.ids[node], to = %self.ids[next], "Ignoring feedback wire");
                    continue;
                }
                if let Some(targets) = forward[node].as_mut() {
                    targets.push(next);
                }
                if forward[next].is_none() {
                    forward[next] = Some(Vec::new());
                    on_path[next] = true;
                    stack.push((next, 0));
                }
            }
        }
        forward
    }

    /// Linear chains in logical execution order.
    ///
    /// Each entry node starts a chain that follows single-output edges. At a
    /// branch the unvisited branch targets close the chain. Nodes not reached
    /// from any entry become chains of their own.
    pub fn chains(&self, nodes: &[LayoutNode]) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut visited = vec![false; n];
        let mut chains = Vec::new();

        let entries: Vec<usize> = (0..n)
            .filter(|&i| self.incoming[i].is_empty() || nodes[i].is_trigger())
            .collect();

        for entry in entries {
            if visited[entry] {
                continue;
            }
            visited[entry] = true;
            let mut chain = vec![entry];
            let mut current = entry;

            loop {
                match self.outgoing[current].as_slice() {
                    [] => break,
                    [next] => {
                        if visited[*next] {
                            break;
                        }
                        visited[*next] = true;
                        chain.push(*next);
                        current = *next;
                    }
                    branches => {
                        for &target in branches {
                            if !visited[target] {
                                visited[target] = true;
                                chain.push(target);
                            }
                        }
                        break;
                    }
                }
            }
            chains.push(chain);
        }

        for (i, seen) in visited.iter().enumerate() {
            if !seen {
                chains.push(vec![i]);
            }
        }
        chains
    }
}
