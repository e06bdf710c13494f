mod activation;
mod methods;
mod types;

pub use activation::Runtime;
pub use methods::RuntimeMethod;
pub use types::{condense_node_sets, InjectParams, ListNodesParams, ModuleSummary, SetStateParams};
