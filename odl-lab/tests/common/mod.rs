//! In-process stand-in for the controller's Restconf API, just enough of it for the client
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use odl_lab_schemas::settings::ControllerConfig;
use serde_json::{json, Value};

/// `admin:admin`
pub const BASIC_ADMIN: &str = "Basic YWRtaW46YWRtaW4=";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub topology: Value,
    pub nodes: Value,
    /// config tree flows keyed by (node id, flow id)
    pub flows: BTreeMap<(String, String), Value>,
    pub requests: Vec<RecordedRequest>,
    /// answer every request with this status
    pub fail_with: Option<StatusCode>,
}

pub struct MockController {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

impl MockController {
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    /// A controller with two switches and one link between them
    pub async fn start_lab() -> Self {
        Self::start(MockState {
            topology: ready_topology(),
            nodes: lab_nodes(),
            ..Default::default()
        }).await
    }

    pub fn config(&self) -> ControllerConfig {
        ControllerConfig::new("127.0.0.1", self.addr.port(), "admin", "admin")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn stored_flows(&self) -> usize {
        self.state.lock().unwrap().flows.len()
    }
}

pub fn empty_topology() -> Value {
    json!({"network-topology": {"topology": [{"topology-id": "flow:1"}]}})
}

pub fn ready_topology() -> Value {
    json!({
        "network-topology": {
            "topology": [{
                "topology-id": "flow:1",
                "node": [{"node-id": "openflow:1"}, {"node-id": "openflow:2"}],
                "link": [{
                    "link-id": "openflow:1:2",
                    "source": {"source-node": "openflow:1", "source-tp": "openflow:1:2"},
                    "destination": {"dest-node": "openflow:2", "dest-tp": "openflow:2:2"}
                }]
            }]
        }
    })
}

pub fn lab_nodes() -> Value {
    let node = |n: u32| json!({
        "id": format!("openflow:{n}"),
        "node-connector": [
            {
                "id": format!("openflow:{n}:1"),
                "flow-node-inventory:port-number": 1,
                "opendaylight-port-statistics:flow-capable-node-connector-statistics": {
                    "bytes": {"received": 100 * n, "transmitted": 200 * n},
                    "packets": {"received": n, "transmitted": 2 * n}
                }
            },
            {"id": format!("openflow:{n}:2"), "flow-node-inventory:port-number": 2},
            {"id": format!("openflow:{n}:LOCAL"), "flow-node-inventory:port-number": "LOCAL"}
        ]
    });
    json!({"nodes": {"node": [node(1), node(2)]}})
}

fn find_node(state: &MockState, node_id: &str) -> Option<Value> {
    state.nodes["nodes"]["node"]
        .as_array()?
        .iter()
        .find(|n| n["id"] == node_id)
        .cloned()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"errors": {"error": [{"error-tag": "data-missing"}]}}))).into_response()
}

async fn handle(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name| headers.get(name).and_then(|v| v.to_str().ok()).map(String::from);
    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        content_type: header_value(header::CONTENT_TYPE),
        accept: header_value(header::ACCEPT),
    });

    if header_value(header::AUTHORIZATION).as_deref() != Some(BASIC_ADMIN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = state.fail_with {
        return status.into_response();
    }

    let path = uri.path().to_string();
    let Some(rest) = path.strip_prefix("/restconf/") else {
        return not_found();
    };
    let segments: Vec<&str> = rest.split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["operational", "network-topology:network-topology"]) => {
            Json(state.topology.clone()).into_response()
        }
        ("GET", ["operational", "opendaylight-inventory:nodes"]) => Json(state.nodes.clone()).into_response(),
        ("GET", ["operational", "opendaylight-inventory:nodes", "node", node_id]) => {
            match find_node(&state, node_id) {
                Some(node) => Json(json!({"node": [node]})).into_response(),
                None => not_found(),
            }
        }
        ("GET", ["operational", "opendaylight-inventory:nodes", "node", node_id, "node-connector"]) => {
            match find_node(&state, node_id) {
                Some(node) => Json(json!({"node-connector": node["node-connector"].clone()})).into_response(),
                None => not_found(),
            }
        }
        ("GET", ["operational", "opendaylight-inventory:nodes", "node", node_id, "flow-node-inventory:table", "0"]) => {
            if find_node(&state, node_id).is_none() {
                return not_found();
            }
            let flows: Vec<Value> = state.flows.iter()
                .filter(|((node, _), _)| node == node_id)
                .map(|(_, flow)| flow.clone())
                .collect();
            Json(json!({"flow-node-inventory:table": [{"id": 0, "flow": flows}]})).into_response()
        }
        ("PUT", ["config", "opendaylight-inventory:nodes", "node", node_id, "flow-node-inventory:table", "0", "flow", flow_id]) => {
            let Ok(flow_body) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let flow = flow_body["flow"][0].clone();
            if flow["id"] != *flow_id {
                return StatusCode::BAD_REQUEST.into_response();
            }
            let key = (node_id.to_string(), flow_id.to_string());
            match state.flows.insert(key, flow) {
                Some(_) => StatusCode::OK.into_response(),
                None => StatusCode::CREATED.into_response(),
            }
        }
        ("DELETE", ["config", "opendaylight-inventory:nodes", "node", node_id, "flow-node-inventory:table", "0", "flow", flow_id]) => {
            match state.flows.remove(&(node_id.to_string(), flow_id.to_string())) {
                Some(_) => StatusCode::OK.into_response(),
                None => not_found(),
            }
        }
        _ => not_found(),
    }
}
