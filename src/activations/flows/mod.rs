mod activation;
mod methods;
mod types;

pub use activation::Flows;
pub use methods::FlowsMethod;
pub use types::{
    AddNodesParams, CreateFlowParams, DeployParams, FlowRefParams, UpdateFlowParams,
    ValidateParams,
};
