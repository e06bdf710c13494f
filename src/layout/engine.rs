use super::geometry::{Canvas, LayoutConfig, Point, SafeZone, WorkspaceBounds};
use super::graph::{ConnectionGraph, LayoutError, LayoutNode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Placement strategy selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Row-major grid continuing from the previously placed node
    #[default]
    CollisionFree,
    /// Left-to-right layers by longest path from the entry nodes
    DagreLr,
    /// Row-major grid indexed by input position
    Grid,
    /// One row per execution chain
    SemanticArticle,
    /// Semantic when the batch is wired together, collision-free otherwise
    Auto,
}

/// Final position of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutStats {
    pub requested: LayoutStrategy,
    pub applied: LayoutStrategy,
    pub placed: usize,
    /// Nodes moved off their preferred position to avoid a collision
    pub relocated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceBounds>,
    pub safe_zone: SafeZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<usize>,
    /// Why the requested strategy was abandoned, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    /// Same order as the input nodes
    pub positions: Vec<PlacedNode>,
    pub stats: LayoutStats,
}

/// Positions computed by one strategy, indexed like the input
struct Plan {
    points: Vec<Point>,
    relocated: usize,
    rows: Option<usize>,
    layers: Option<usize>,
}

impl Plan {
    fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
            relocated: 0,
            rows: None,
            layers: None,
        }
    }
}

/// Assigns non-overlapping canvas positions to a batch of new nodes.
///
/// Pure and synchronous: the caller supplies the coordinates already on the
/// canvas. Never fails; a strategy that cannot finish degrades to
/// [`LayoutStrategy::CollisionFree`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layout(
        &self,
        existing: &[Point],
        nodes: &[LayoutNode],
        strategy: LayoutStrategy,
    ) -> LayoutResult {
        let workspace = WorkspaceBounds::from_points(existing);
        let zone = SafeZone::compute(workspace.as_ref(), &self.config);
        let graph = ConnectionGraph::build(nodes);

        let applied = match strategy {
            LayoutStrategy::Auto if graph.has_edges() => LayoutStrategy::SemanticArticle,
            LayoutStrategy::Auto => LayoutStrategy::CollisionFree,
            other => other,
        };

        let attempt = {
            let mut canvas = Canvas::new(&self.config, zone, existing);
            match applied {
                LayoutStrategy::CollisionFree | LayoutStrategy::Auto => {
                    Ok(self.collision_free(&mut canvas, nodes.len()))
                }
                LayoutStrategy::Grid => Ok(self.grid(&mut canvas, nodes.len())),
                LayoutStrategy::DagreLr => self.hierarchical(&mut canvas, &graph),
                LayoutStrategy::SemanticArticle => Ok(self.semantic(&mut canvas, &graph, nodes)),
            }
        };

        let (plan, applied, fallback) = match attempt {
            Ok(plan) => (plan, applied, None),
            Err(e) => {
                tracing::warn!("{:?} layout failed ({}), using collision-free grid", applied, e);
                let mut canvas = Canvas::new(&self.config, zone, existing);
                (
                    self.collision_free(&mut canvas, nodes.len()),
                    LayoutStrategy::CollisionFree,
                    Some(e.to_string()),
                )
            }
        };

        tracing::debug!(
            requested = ?strategy,
            applied = ?applied,
            placed = nodes.len(),
            relocated = plan.relocated,
            "Computed layout"
        );

        let positions = nodes
            .iter()
            .zip(&plan.points)
            .map(|(node, p)| PlacedNode {
                id: node.id.clone(),
                x: p.x,
                y: p.y,
            })
            .collect();

        LayoutResult {
            positions,
            stats: LayoutStats {
                requested: strategy,
                applied,
                placed: nodes.len(),
                relocated: plan.relocated,
                workspace,
                safe_zone: zone,
                rows: plan.rows,
                layers: plan.layers,
                fallback,
            },
        }
    }

    fn collision_free(&self, canvas: &mut Canvas<'_>, n: usize) -> Plan {
        let zone = canvas.zone();
        let per_row = self.config.nodes_per_row.max(1);
        let mut plan = Plan::with_capacity(n);
        let mut previous: Option<Point> = None;

        for i in 0..n {
            let preferred = match previous {
                None => zone.anchor(),
                Some(prev) if i % per_row == 0 => Point::new(zone.start_x, prev.y).offset(0, self.config.spacing_y),
                Some(prev) => prev.offset(self.config.spacing_x, 0),
            };
            let placement = canvas.place(preferred);
            plan.relocated += usize::from(placement.relocated);
            plan.points.push(placement.point);
            previous = Some(placement.point);
        }
        plan
    }

    fn grid(&self, canvas: &mut Canvas<'_>, n: usize) -> Plan {
        let zone = canvas.zone();
        let per_row = self.config.nodes_per_row.max(1);
        let mut plan = Plan::with_capacity(n);

        for i in 0..n {
            let (col, row) = ((i % per_row) as i64, (i / per_row) as i64);
            let preferred = zone
                .anchor()
                .offset(col * self.config.spacing_x, row * self.config.spacing_y);
            let placement = canvas.place(preferred);
            plan.relocated += usize::from(placement.relocated);
            plan.points.push(placement.point);
        }
        plan
    }

    fn hierarchical(&self, canvas: &mut Canvas<'_>, graph: &ConnectionGraph) -> Result<Plan, LayoutError> {
        let zone = canvas.zone();
        let layers = graph.layers()?;
        let layer_count = layers.iter().max().map_or(0, |max| max + 1);

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for (node, &layer) in layers.iter().enumerate() {
            members[layer].push(node);
        }

        let mut points = vec![zone.anchor(); graph.len()];
        let mut plan = Plan::with_capacity(graph.len());
        for (layer, nodes) in members.iter().enumerate() {
            for (slot, &node) in nodes.iter().enumerate() {
                let preferred = zone.anchor().offset(
                    layer as i64 * self.config.level_width,
                    slot as i64 * self.config.spacing_y,
                );
                let placement = canvas.place(preferred);
                plan.relocated += usize::from(placement.relocated);
                points[node] = placement.point;
            }
        }

        plan.points = points;
        plan.layers = Some(layer_count);
        Ok(plan)
    }

    fn semantic(&self, canvas: &mut Canvas<'_>, graph: &ConnectionGraph, nodes: &[LayoutNode]) -> Plan {
        let zone = canvas.zone();
        let chains = graph.chains(nodes);

        let mut points = vec![zone.anchor(); graph.len()];
        let mut plan = Plan::with_capacity(graph.len());
        for (row, chain) in chains.iter().enumerate() {
            for (col, &node) in chain.iter().enumerate() {
                let preferred = zone.anchor().offset(
                    col as i64 * self.config.spacing_x,
                    row as i64 * self.config.chain_row_spacing,
                );
                let placement = canvas.place(preferred);
                plan.relocated += usize::from(placement.relocated);
                points[node] = placement.point;
            }
        }

        plan.points = points;
        plan.rows = Some(chains.len());
        plan
    }
}
