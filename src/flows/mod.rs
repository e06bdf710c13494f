//! Flow editing: merge modes, structural validation and the
//! fetch-merge-layout-write cycle against a live instance

mod editor;
mod merge;
mod validation;

pub use editor::{
    generate_node_id, layout_node_of, point_of, EditOutcome, EditReport, FlowEdit, FlowEditor,
    ValidationStage,
};
pub use merge::{merge_nodes, MergeMode, MergeOutcome};
pub use validation::{validate_nodes, ValidationReport};
