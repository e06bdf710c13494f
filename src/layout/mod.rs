//! Incremental layout for nodes added to an existing Node-RED canvas
//!
//! New nodes go into a safe zone below the existing content and are kept
//! clear of every existing or newly placed node by a rectangle-overlap test.
//!
//! ## Strategies
//!
//! - `collision_free` - row-major grid continuing from the previous node
//! - `grid` - row-major grid indexed by input position
//! - `dagre_lr` - longest-path layers, left to right
//! - `semantic_article` - one row per execution chain
//! - `auto` - semantic when the batch is wired together

mod engine;
mod geometry;
mod graph;

#[cfg(test)]
mod tests;

pub use engine::{LayoutEngine, LayoutResult, LayoutStats, LayoutStrategy, PlacedNode};
pub use geometry::{Canvas, LayoutConfig, Placement, Point, SafeZone, WorkspaceBounds, CANVAS_LIMIT};
pub use graph::{ConnectionGraph, LayoutError, LayoutNode, TRIGGER_TYPES};
