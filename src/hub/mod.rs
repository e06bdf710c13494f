pub mod hub;

pub use hub::{
    parse_params, params_schema, Activation, ActivationInfo, Hub, HubError, MethodSchema, NoParams,
    ToolOutput,
};
