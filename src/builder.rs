//! Hub builder - constructs a fully configured Hub instance
//!
//! Used by the main binary and the integration tests.

use std::sync::Arc;

use crate::activations::{auth::Auth, flows::Flows, runtime::Runtime};
use crate::auth::TokenAuthManager;
use crate::config::NodeRedConfig;
use crate::error::Result;
use crate::flows::FlowEditor;
use crate::hub::Hub;
use crate::layout::LayoutEngine;
use crate::nodered::NodeRedClient;

/// Build the hub with every activation sharing one client and credential cache
pub fn build_hub(config: &NodeRedConfig) -> Result<Arc<Hub>> {
    config.check()?;
    let http = config.http_client()?;

    let auth = Arc::new(TokenAuthManager::new(config.auth_config(), http.clone()));
    let client = Arc::new(NodeRedClient::new(http, config.url.clone(), auth.clone()));
    let editor = Arc::new(FlowEditor::new(client.clone(), LayoutEngine::default()));

    tracing::debug!(url = %config.url, source = ?auth.source(), "Building hub");

    Ok(Arc::new(
        Hub::new()
            .register(Auth::new(auth))
            .register(Flows::new(editor))
            .register(Runtime::new(client)),
    ))
}
