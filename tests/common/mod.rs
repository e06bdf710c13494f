//! In-process mock of the Node-RED admin API
//!
//! Binds to 127.0.0.1:0, keeps the flow configuration in memory and records
//! what clients wrote so tests can assert on it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nodered_mcp::NodeRedConfig;
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password";

/// How the mock instance guards its admin API
#[derive(Debug, Clone)]
pub enum MockAuth {
    /// No adminAuth configured; `/auth/token` does not exist
    None,
    /// Password grant for USERNAME / PASSWORD
    Password,
    /// A fixed pre-shared token
    Static(String),
    /// Password login is configured but the token endpoint answers 500 with this body
    Failing(String),
}

#[derive(Debug, Default)]
struct MockState {
    flows: Vec<Value>,
    password_login: bool,
    accepted_token: Option<String>,
    token_failure: Option<String>,
    issued: usize,
    next_flow: usize,
    last_put: Option<Value>,
    last_deploy: Option<(String, Value)>,
    injected: Vec<String>,
    run_state: String,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockNodeRed {
    pub url: String,
    state: Shared,
}

impl MockNodeRed {
    pub async fn start(flows: Vec<Value>, auth: MockAuth) -> Self {
        let mut state = MockState {
            flows,
            run_state: "start".to_string(),
            ..Default::default()
        };
        match auth {
            MockAuth::None => {}
            MockAuth::Password => state.password_login = true,
            MockAuth::Static(token) => state.accepted_token = Some(token),
            MockAuth::Failing(body) => {
                state.password_login = true;
                state.token_failure = Some(body);
            }
        }
        let state = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/auth/token", post(token))
            .route("/flows", get(get_flows).post(deploy_flows))
            .route("/flow", post(create_flow))
            .route("/flow/:id", get(get_flow).put(update_flow).delete(delete_flow))
            .route("/flows/state", get(get_state).post(set_state))
            .route("/nodes", get(get_nodes))
            .route("/inject/:id", post(inject))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Config for a client with password login against this mock
    pub fn password_config(&self) -> NodeRedConfig {
        NodeRedConfig::new(
            self.url.clone(),
            None,
            Some(USERNAME.to_string()),
            Some(PASSWORD.to_string()),
            Duration::from_secs(5),
        )
    }

    /// Number of successful password grants served
    pub fn tokens_issued(&self) -> usize {
        self.state.lock().issued
    }

    /// Make every previously issued token stale
    pub fn revoke_tokens(&self) {
        self.state.lock().accepted_token = Some("revoked".to_string());
    }

    pub fn flows(&self) -> Vec<Value> {
        self.state.lock().flows.clone()
    }

    pub fn last_put(&self) -> Option<Value> {
        self.state.lock().last_put.clone()
    }

    pub fn last_deploy(&self) -> Option<(String, Value)> {
        self.state.lock().last_deploy.clone()
    }

    pub fn injected(&self) -> Vec<String> {
        self.state.lock().injected.clone()
    }

    pub fn run_state(&self) -> String {
        self.state.lock().run_state.clone()
    }
}

/// Two tabs; "Main" holds a wired inject -> debug pair
pub fn sample_flows() -> Vec<Value> {
    vec![
        json!({"id": "t1", "type": "tab", "label": "Main", "disabled": false, "info": ""}),
        json!({"id": "t2", "type": "tab", "label": "Sensors", "disabled": true, "info": "MQTT inputs"}),
        json!({"id": "n1", "type": "inject", "z": "t1", "x": 100, "y": 80, "wires": [["n2"]]}),
        json!({"id": "n2", "type": "debug", "z": "t1", "x": 300, "y": 80, "wires": []}),
    ]
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let Some(token) = &state.accepted_token else {
        return !state.password_login;
    };
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", token))
}

fn tab_of(state: &MockState, id: &str) -> Option<Value> {
    let tab = state
        .flows
        .iter()
        .find(|n| n["type"] == "tab" && n["id"] == id)?;
    let nodes: Vec<Value> = state
        .flows
        .iter()
        .filter(|n| n["z"] == id)
        .cloned()
        .collect();
    Some(json!({
        "id": id,
        "label": tab["label"],
        "disabled": tab.get("disabled").cloned().unwrap_or(json!(false)),
        "info": tab.get("info").cloned().unwrap_or(json!("")),
        "nodes": nodes,
        "configs": [],
    }))
}

async fn token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    if !state.password_login {
        return (StatusCode::NOT_FOUND, "Cannot POST /auth/token").into_response();
    }
    if let Some(body) = &state.token_failure {
        return (StatusCode::INTERNAL_SERVER_ERROR, body.clone()).into_response();
    }
    let well_formed = body["client_id"] == "node-red-admin"
        && body["grant_type"] == "password"
        && body["scope"] == "*";
    if !well_formed || body["username"] != USERNAME || body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response();
    }

    state.issued += 1;
    let token = format!("tok-{}", state.issued);
    state.accepted_token = Some(token.clone());
    Json(json!({"access_token": token, "expires_in": 604800, "token_type": "Bearer"})).into_response()
}

async fn get_flows(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(Value::Array(state.flows.clone())).into_response()
}

async fn deploy_flows(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let deployment = headers
        .get("node-red-deployment-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("full")
        .to_string();
    state.flows = body.as_array().cloned().unwrap_or_default();
    state.last_deploy = Some((deployment, body));
    Json(json!({"rev": "4f3e2d1c"})).into_response()
}

async fn get_flow(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match tab_of(&state, &id) {
        Some(flow) => Json(flow).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

async fn create_flow(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.next_flow += 1;
    let id = format!("f{}", state.next_flow);
    state.flows.push(json!({"id": id, "type": "tab", "label": body["label"], "info": body["info"]}));
    for node in body["nodes"].as_array().cloned().unwrap_or_default() {
        let mut node = node;
        node["z"] = json!(id);
        state.flows.push(node);
    }
    Json(json!({"id": id})).into_response()
}

async fn update_flow(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if tab_of(&state, &id).is_none() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    state.flows.retain(|n| n["z"] != id.as_str());
    for node in body["nodes"].as_array().cloned().unwrap_or_default() {
        let mut node = node;
        node["z"] = json!(id);
        state.flows.push(node);
    }
    state.last_put = Some(body);
    Json(json!({"id": id})).into_response()
}

async fn delete_flow(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if tab_of(&state, &id).is_none() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    state.flows.retain(|n| n["id"] != id.as_str() && n["z"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn get_state(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({"state": state.run_state})).into_response()
}

async fn set_state(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.run_state = body["state"].as_str().unwrap_or_default().to_string();
    Json(json!({"state": state.run_state})).into_response()
}

async fn get_nodes(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": "node-red/inject", "module": "node-red", "version": "4.0.2", "enabled": true, "types": ["inject"]},
        {"id": "node-red/debug", "module": "node-red", "version": "4.0.2", "enabled": true, "types": ["debug"]},
        {"id": "node-red-contrib-modbus/modbus", "module": "node-red-contrib-modbus", "version": "5.40.0", "enabled": true, "types": ["modbus-read", "modbus-write"]}
    ]))
    .into_response()
}

async fn inject(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.injected.push(id);
    (StatusCode::OK, "OK").into_response()
}
