use serde::Serialize;

/// A node position on the Node-RED canvas (node centre, in pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Largest coordinate magnitude accepted from a flow
pub const CANVAS_LIMIT: i64 = 1_000_000_000;

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Point from raw editor coordinates, rounded and clamped to the canvas
    pub fn from_f64(x: f64, y: f64) -> Self {
        let limit = CANVAS_LIMIT as f64;
        Self::new(
            x.round().clamp(-limit, limit) as i64,
            y.round().clamp(-limit, limit) as i64,
        )
    }

    /// Shifted copy; saturates at the `i64` range
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Tunables shared by every placement strategy
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub node_width: i64,
    pub node_height: i64,
    /// Minimum gap between two node boxes
    pub collision_buffer: i64,
    /// Horizontal distance between neighbours in a row
    pub spacing_x: i64,
    /// Vertical distance between rows in the grid strategies
    pub spacing_y: i64,
    pub nodes_per_row: usize,
    /// Horizontal distance between layers in the hierarchical strategy
    pub level_width: i64,
    /// Vertical distance between chains in the semantic strategy
    pub chain_row_spacing: i64,
    /// Gap between existing content and the safe zone
    pub safe_zone_margin: i64,
    /// Left margin, and the anchor used on an empty canvas
    pub default_margin: i64,
    /// Spiral search radius in grid cells
    pub max_search_radius: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 120,
            node_height: 30,
            collision_buffer: 20,
            spacing_x: 200,
            spacing_y: 80,
            nodes_per_row: 5,
            level_width: 220,
            chain_row_spacing: 100,
            safe_zone_margin: 100,
            default_margin: 100,
            max_search_radius: 12,
        }
    }
}

impl LayoutConfig {
    /// Rectangle overlap test between two node centres, buffer included
    pub fn collides(&self, a: Point, b: Point) -> bool {
        a.x.abs_diff(b.x) < self.step_x().unsigned_abs()
            && a.y.abs_diff(b.y) < self.step_y().unsigned_abs()
    }

    fn step_x(&self) -> i64 {
        self.node_width + self.collision_buffer
    }

    fn step_y(&self) -> i64 {
        self.node_height + self.collision_buffer
    }
}

/// Bounding rectangle of the existing nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkspaceBounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl WorkspaceBounds {
    /// `None` for an empty canvas
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Region below the existing content reserved for new nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeZone {
    pub start_x: i64,
    pub start_y: i64,
}

impl SafeZone {
    pub fn compute(bounds: Option<&WorkspaceBounds>, config: &LayoutConfig) -> Self {
        match bounds {
            None => Self {
                start_x: config.default_margin,
                start_y: config.default_margin,
            },
            Some(b) => Self {
                start_x: config.default_margin.max(b.min_x),
                start_y: b.max_y.saturating_add(config.safe_zone_margin),
            },
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.start_x && p.y >= self.start_y
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.max(self.start_x), p.y.max(self.start_y))
    }
}

/// Outcome of placing one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub point: Point,
    /// Whether the node ended up somewhere other than its preferred position
    pub relocated: bool,
}

/// Occupied coordinates for one layout call, existing and newly placed
#[derive(Debug, Clone)]
pub struct Canvas<'a> {
    config: &'a LayoutConfig,
    zone: SafeZone,
    occupied: Vec<Point>,
}

impl<'a> Canvas<'a> {
    pub fn new(config: &'a LayoutConfig, zone: SafeZone, existing: &[Point]) -> Self {
        Self {
            config,
            zone,
            occupied: existing.to_vec(),
        }
    }

    pub fn zone(&self) -> SafeZone {
        self.zone
    }

    pub fn is_free(&self, p: Point) -> bool {
        !self.occupied.iter().any(|o| self.config.collides(*o, p))
    }

    /// Closest free cell to `preferred` within the search radius.
    ///
    /// Tries the safe-zone clamped position first, then rings of
    /// grid-quantized offsets around it, staying inside the safe zone.
    pub fn search(&self, preferred: Point) -> Option<Point> {
        let base = self.zone.clamp(preferred);
        if self.is_free(base) {
            return Some(base);
        }

        let (step_x, step_y) = (self.config.step_x(), self.config.step_y());
        for radius in 1..=self.config.max_search_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let candidate = base.offset(dx * step_x, dy * step_y);
                    if self.zone.contains(candidate) && self.is_free(candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Position at the anchor column below everything occupied; always free
    pub fn append_point(&self) -> Point {
        let lowest = self.occupied.iter().map(|p| p.y).max();
        let y = match lowest {
            Some(max_y) => self
                .zone
                .start_y
                .max(max_y.saturating_add(self.config.spacing_y.max(self.config.step_y()))),
            None => self.zone.start_y,
        };
        Point::new(self.zone.start_x, y)
    }

    /// Place a node as close to `preferred` as possible and mark it occupied
    pub fn place(&mut self, preferred: Point) -> Placement {
        let point = self.search(preferred).unwrap_or_else(|| {
            tracing::debug!(
                x = preferred.x,
                y = preferred.y,
                "No free cell within search radius, appending below content"
            );
            self.append_point()
        });
        self.occupied.push(point);
        Placement {
            point,
            relocated: point != preferred,
        }
    }
}
