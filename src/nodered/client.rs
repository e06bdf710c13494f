use super::types::{DeploymentType, FlowState, TabSummary};
use crate::auth::{TokenAuthManager, TokenSource};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

const DEPLOYMENT_TYPE_HEADER: &str = "node-red-deployment-type";

/// Authenticated client for the Node-RED admin API.
///
/// Every call asks the [`TokenAuthManager`] for headers first. A 401 on a
/// dynamically obtained token invalidates it and retries the call once.
pub struct NodeRedClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<TokenAuthManager>,
}

impl NodeRedClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, auth: Arc<TokenAuthManager>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<TokenAuthManager> {
        &self.auth
    }

    /// Send a request and decode the response body.
    ///
    /// Empty bodies decode to `Value::Null`, non-JSON bodies to a string.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra_headers: HeaderMap,
    ) -> Result<Value> {
        let mut response = self.send(method.clone(), path, body, extra_headers.clone()).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.auth.source() == TokenSource::Dynamic {
            tracing::info!("{} {} returned 401, refreshing token and retrying once", method, path);
            self.auth.invalidate();
            response = self.send(method.clone(), path, body, extra_headers).await?;
        }

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::Transport {
            method: method.to_string(),
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!("{} {} failed with HTTP {}", method, path, status.as_u16());
            return Err(Error::UpstreamApi {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra_headers: HeaderMap,
    ) -> Result<reqwest::Response> {
        let mut headers = self.auth.auth_headers().await?;
        headers.extend(extra_headers);
        headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static("application/json"));

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| Error::Transport {
            method: method.to_string(),
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None, HeaderMap::new()).await
    }

    // ------------------------------------------------------------------
    // Flows
    // ------------------------------------------------------------------

    /// Full flow configuration: tabs, subflows, config nodes and flow nodes
    pub async fn get_flows(&self) -> Result<Value> {
        self.get("/flows").await
    }

    pub async fn deploy_flows(&self, flows: &Value, deployment: DeploymentType) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(
            DEPLOYMENT_TYPE_HEADER,
            HeaderValue::from_static(deployment.as_str()),
        );
        self.request(Method::POST, "/flows", Some(flows), headers).await
    }

    pub async fn get_flow(&self, id: &str) -> Result<Value> {
        self.get(&format!("/flow/{}", id)).await
    }

    /// Create a tab; Node-RED answers with the new flow id
    pub async fn create_flow(&self, flow: &Value) -> Result<String> {
        let response = self
            .request(Method::POST, "/flow", Some(flow), HeaderMap::new())
            .await?;
        response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Decode {
                path: "/flow".to_string(),
                reason: "response has no flow id".to_string(),
            })
    }

    pub async fn update_flow(&self, id: &str, flow: &Value) -> Result<Value> {
        self.request(Method::PUT, &format!("/flow/{}", id), Some(flow), HeaderMap::new())
            .await
    }

    pub async fn delete_flow(&self, id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/flow/{}", id), None, HeaderMap::new())
            .await
            .map(|_| ())
    }

    /// Tab nodes from the full flow configuration
    pub async fn list_tabs(&self) -> Result<Vec<TabSummary>> {
        let flows = self.get_flows().await?;
        Ok(tabs_of(&flows))
    }

    /// Resolve a flow by id, then exact label, then case-insensitive label
    pub async fn resolve_flow_id(&self, query: &str) -> Result<String> {
        let tabs = self.list_tabs().await?;
        find_tab(&tabs, query)
            .map(|tab| tab.id.clone())
            .ok_or_else(|| Error::FlowNotFound {
                query: query.to_string(),
                available: tabs
                    .iter()
                    .map(|t| format!("{} ({})", t.label, t.id))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    // ------------------------------------------------------------------
    // Runtime
    // ------------------------------------------------------------------

    pub async fn get_flows_state(&self) -> Result<Value> {
        self.get("/flows/state").await
    }

    pub async fn set_flows_state(&self, state: FlowState) -> Result<Value> {
        self.request(
            Method::POST,
            "/flows/state",
            Some(&json!({ "state": state.as_str() })),
            HeaderMap::new(),
        )
        .await
    }

    /// Installed node sets
    pub async fn get_nodes(&self) -> Result<Value> {
        self.get("/nodes").await
    }

    pub async fn inject(&self, node_id: &str) -> Result<Value> {
        self.request(Method::POST, &format!("/inject/{}", node_id), None, HeaderMap::new())
            .await
    }
}

pub(crate) fn tabs_of(flows: &Value) -> Vec<TabSummary> {
    flows
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .filter(|n| n.get("type").and_then(Value::as_str) == Some("tab"))
                .filter_map(|n| serde_json::from_value(n.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn find_tab<'a>(tabs: &'a [TabSummary], query: &str) -> Option<&'a TabSummary> {
    tabs.iter()
        .find(|t| t.id == query)
        .or_else(|| tabs.iter().find(|t| t.label == query))
        .or_else(|| tabs.iter().find(|t| t.label.eq_ignore_ascii_case(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flows() -> Value {
        json!([
            { "id": "t1", "type": "tab", "label": "Main", "disabled": false, "info": "" },
            { "id": "t2", "type": "tab", "label": "Sensors" },
            { "id": "n1", "type": "inject", "z": "t1", "x": 100, "y": 80, "wires": [[]] },
            { "id": "c1", "type": "mqtt-broker", "broker": "localhost" }
        ])
    }

    #[test]
    fn test_tabs_of_filters_tab_nodes() {
        let tabs = tabs_of(&sample_flows());
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[1].label, "Sensors");
        assert!(!tabs[1].disabled);
    }

    #[test]
    fn test_find_tab_by_id_label_and_case() {
        let tabs = tabs_of(&sample_flows());
        assert_eq!(find_tab(&tabs, "t2").unwrap().label, "Sensors");
        assert_eq!(find_tab(&tabs, "Main").unwrap().id, "t1");
        assert_eq!(find_tab(&tabs, "sensors").unwrap().id, "t2");
        assert!(find_tab(&tabs, "missing").is_none());
    }
}
