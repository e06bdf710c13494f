use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

/// Error type for hub routing and tool execution
#[derive(Debug, Clone, thiserror::Error)]
pub enum HubError {
    #[error("Activation not found: {0}")]
    ActivationNotFound(String),
    #[error("Method not found: {activation}.{method}")]
    MethodNotFound { activation: String, method: String },
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("{0}")]
    Execution(String),
}

impl From<crate::error::Error> for HubError {
    fn from(e: crate::error::Error) -> Self {
        HubError::Execution(e.to_string())
    }
}

/// Information about an activation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationInfo {
    pub namespace: String,
    pub version: String,
    pub description: String,
    pub methods: Vec<String>,
}

/// Schema for a single method
#[derive(Debug, Clone)]
pub struct MethodSchema {
    pub name: String,
    pub description: String,
    pub params: Option<schemars::Schema>,
}

impl MethodSchema {
    pub fn new(name: &str, description: &str, params: Option<schemars::Schema>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }
}

/// Arguments record for methods that take none
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Result of one tool invocation.
///
/// `is_error` marks a failure the caller should see as tool output rather
/// than a protocol error (upstream rejections, validation reports).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: Value,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn data<T: Serialize>(value: &T) -> Result<Self, HubError> {
        let content = serde_json::to_value(value)
            .map_err(|e| HubError::Execution(format!("failed to encode result: {}", e)))?;
        Ok(Self {
            content,
            is_error: false,
        })
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self {
            content: Value::String(message.into()),
            is_error: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: Value::String(message.into()),
            is_error: true,
        }
    }
}

/// Decode tool arguments into a typed params record
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, HubError> {
    // Clients may send null for "no arguments"
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params).map_err(|e| HubError::InvalidParams(e.to_string()))
}

pub fn params_schema<T: JsonSchema>() -> Option<schemars::Schema> {
    Some(schemars::schema_for!(T))
}

/// A namespace of tools served by the hub.
///
/// Methods are addressed as `namespace.method`.
#[async_trait]
pub trait Activation: Send + Sync + 'static {
    fn namespace(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        "No description available"
    }

    fn methods(&self) -> Vec<MethodSchema>;

    async fn call(&self, method: &str, params: Value) -> Result<ToolOutput, HubError>;
}

/// Registry and router for activations
pub struct Hub {
    activations: HashMap<String, Arc<dyn Activation>>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            activations: HashMap::new(),
        }
    }

    pub fn register<A: Activation>(mut self, activation: A) -> Self {
        let namespace = activation.namespace().to_string();
        self.activations.insert(namespace, Arc::new(activation));
        self
    }

    /// Every `namespace.method`, sorted
    pub fn list_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .activations
            .iter()
            .flat_map(|(namespace, activation)| {
                activation
                    .methods()
                    .into_iter()
                    .map(move |m| format!("{}.{}", namespace, m.name))
            })
            .collect();
        methods.sort();
        methods
    }

    pub fn list_activations(&self) -> Vec<ActivationInfo> {
        let mut activations: Vec<ActivationInfo> = self
            .activations
            .values()
            .map(|a| ActivationInfo {
                namespace: a.namespace().to_string(),
                version: a.version().to_string(),
                description: a.description().to_string(),
                methods: a.methods().into_iter().map(|m| m.name).collect(),
            })
            .collect();
        activations.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        activations
    }

    /// Method schemas keyed by fully qualified name, sorted by name
    pub fn list_schemas(&self) -> Vec<(String, MethodSchema)> {
        let mut schemas: Vec<(String, MethodSchema)> = self
            .activations
            .iter()
            .flat_map(|(namespace, activation)| {
                activation
                    .methods()
                    .into_iter()
                    .map(move |m| (format!("{}.{}", namespace, m.name), m))
            })
            .collect();
        schemas.sort_by(|a, b| a.0.cmp(&b.0));
        schemas
    }

    /// Call a method; format "namespace.method" (e.g. "flows.get")
    pub async fn route(&self, method: &str, params: Value) -> Result<ToolOutput, HubError> {
        let (namespace, method_name) = self.parse_method(method)?;
        let activation = self
            .activations
            .get(namespace)
            .ok_or_else(|| HubError::ActivationNotFound(namespace.to_string()))?;

        tracing::debug!(activation = namespace, method = method_name, "Routing call");
        activation.call(method_name, params).await
    }

    fn parse_method<'a>(&self, method: &'a str) -> Result<(&'a str, &'a str), HubError> {
        method
            .split_once('.')
            .ok_or_else(|| HubError::MethodNotFound {
                activation: method.to_string(),
                method: String::new(),
            })
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
