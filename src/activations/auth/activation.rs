use super::methods::AuthMethod;
use crate::auth::{TokenAuthManager, TokenSource};
use crate::hub::{parse_params, Activation, HubError, MethodSchema, NoParams, ToolOutput};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Credential introspection for the configured Node-RED instance
#[derive(Clone)]
pub struct Auth {
    manager: Arc<TokenAuthManager>,
}

impl Auth {
    pub fn new(manager: Arc<TokenAuthManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Activation for Auth {
    fn namespace(&self) -> &str {
        "auth"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Node-RED admin API authentication"
    }

    fn methods(&self) -> Vec<MethodSchema> {
        AuthMethod::ALL.iter().map(AuthMethod::schema).collect()
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolOutput, HubError> {
        let Some(method) = AuthMethod::from_name(method) else {
            return Err(HubError::MethodNotFound {
                activation: "auth".to_string(),
                method: method.to_string(),
            });
        };
        let _: NoParams = parse_params(params)?;

        match method {
            AuthMethod::Status => ToolOutput::data(&self.manager.status()),
            AuthMethod::Refresh => {
                if self.manager.source() != TokenSource::Dynamic {
                    return Ok(ToolOutput::failure(
                        "Token refresh needs NODE_RED_USERNAME and NODE_RED_PASSWORD",
                    ));
                }
                self.manager.invalidate();
                self.manager.refresh().await?;
                ToolOutput::data(&self.manager.status())
            }
        }
    }
}
