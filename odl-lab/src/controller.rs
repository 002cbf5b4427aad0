use std::fmt::Display;
use std::future::Future;
use odl_lab_schemas::flow::FlowConfig;
use odl_lab_schemas::inventory::{FlowTableDocument, NodeConnector, NodeConnectorDocument, NodeDocument, NodesDocument};
use odl_lab_schemas::settings::ControllerConfig;
use odl_lab_schemas::topology::NetworkTopologyDocument;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{Instrument, Span};
use crate::error::ControllerError;

const OPERATIONAL_TOPOLOGY: &str = "network-topology:network-topology";
const INVENTORY_NODES: &str = "opendaylight-inventory:nodes";
const FLOW_TABLE: &str = "flow-node-inventory:table";

/// Client for the controller's Restconf API. Every call makes exactly one request, there is no
/// retrying here, callers that want to wait for something use the discovery waiter.
#[derive(Debug, Clone)]
pub struct OdlController {
    client: Client,
    base_url: Url,
    config: ControllerConfig,
    span: Span,
}

impl OdlController {
    pub fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        let span = tracing::info_span!("odl_controller", base_url = %config.base_url());
        Self::with_span(config, span)
    }

    /// Build the client logging under `span` instead of its own
    pub fn with_span(config: ControllerConfig, span: Span) -> Result<Self, ControllerError> {
        let base = config.base_url();
        let base_url = Url::parse(&base).map_err(|err| ControllerError::InvalidEndpoint {
            url: base.clone(),
            reason: err.to_string(),
        })?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url,
            config,
            span,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Append the segments to the base url, each one is percent encoded on its own so ids
    /// containing `/` or `#` stay a single segment
    fn resource_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    pub fn topology_url(&self) -> String {
        self.resource_url(&["operational", OPERATIONAL_TOPOLOGY])
    }

    pub fn nodes_url(&self) -> String {
        self.resource_url(&["operational", INVENTORY_NODES])
    }

    pub fn node_url(&self, node_id: &str) -> String {
        self.resource_url(&["operational", INVENTORY_NODES, "node", node_id])
    }

    pub fn node_connectors_url(&self, node_id: &str) -> String {
        self.resource_url(&["operational", INVENTORY_NODES, "node", node_id, "node-connector"])
    }

    pub fn flow_table_url(&self, node_id: &str) -> String {
        self.resource_url(&["operational", INVENTORY_NODES, "node", node_id, FLOW_TABLE, "0"])
    }

    /// Config tree location of one flow, the same path is used to write and to delete it
    pub fn flow_url(&self, node_id: &str, flow_id: &str) -> String {
        self.resource_url(&["config", INVENTORY_NODES, "node", node_id, FLOW_TABLE, "0", "flow", flow_id])
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, ControllerError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ControllerError::from_status(url, status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ControllerError> {
        tracing::trace!("GET {url}");
        let resp = self.send(self.request(Method::GET, &url), &url).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|source| ControllerError::Decode { url, source })
    }

    /// Run `fut` inside this client's span and log the failure, if any, once
    async fn logged<T, F>(&self, what: impl Display, fut: F) -> Result<T, ControllerError>
    where
        F: Future<Output = Result<T, ControllerError>>,
    {
        async move {
            let res = fut.await;
            if let Err(err) = &res {
                tracing::error!("failed to {what}: {err}");
            }
            res
        }
        .instrument(self.span.clone())
        .await
    }

    /// Read the operational network topology
    pub async fn get_topology(&self) -> Result<NetworkTopologyDocument, ControllerError> {
        self.logged("retrieve topology", self.get_json(self.topology_url())).await
    }

    /// Read the full node inventory
    pub async fn get_nodes(&self) -> Result<NodesDocument, ControllerError> {
        self.logged("retrieve nodes", self.get_json(self.nodes_url())).await
    }

    /// Read the connectors (ports) of a single node
    pub async fn get_node_connectors(&self, node_id: &str) -> Result<Vec<NodeConnector>, ControllerError> {
        let fut = async {
            let url = self.node_url(node_id);
            let doc: NodeDocument = self.get_json(url.clone()).await?;
            let node = doc.node.into_iter()
                .find(|n| n.id == node_id)
                .ok_or(ControllerError::NotFound { url })?;
            Ok::<_, ControllerError>(node.node_connector)
        };
        self.logged(format!("retrieve connectors for node {node_id}"), fut).await
    }

    /// Read table 0 of a node from the operational tree
    pub async fn get_flows(&self, node_id: &str) -> Result<FlowTableDocument, ControllerError> {
        self.logged(
            format!("retrieve flows for node {node_id}"),
            self.get_json(self.flow_table_url(node_id)),
        ).await
    }

    /// Read the per port counters of a node
    pub async fn get_node_statistics(&self, node_id: &str) -> Result<Vec<NodeConnector>, ControllerError> {
        let fut = async {
            let doc: NodeConnectorDocument = self.get_json(self.node_connectors_url(node_id)).await?;
            Ok::<_, ControllerError>(doc.node_connector)
        };
        self.logged(format!("retrieve statistics for node {node_id}"), fut).await
    }

    /// Write a flow to the config tree. This is a PUT so writing the same flow twice replaces it.
    /// Every flow in `flow_body` must carry `flow_id`, otherwise nothing is sent.
    pub async fn install_flow(&self, node_id: &str, flow_id: &str, flow_body: &FlowConfig) -> Result<(), ControllerError> {
        let fut = async {
            let body_ids = flow_body.flow_ids();
            if body_ids.is_empty() || body_ids.iter().any(|id| *id != flow_id) {
                return Err(ControllerError::FlowIdMismatch {
                    path_id: flow_id.to_string(),
                    body_ids: body_ids.into_iter().map(String::from).collect(),
                });
            }
            let url = self.flow_url(node_id, flow_id);
            tracing::trace!("PUT {url}");
            self.send(self.request(Method::PUT, &url).json(flow_body), &url).await?;
            tracing::info!("flow {flow_id} installed on node {node_id}");
            Ok::<_, ControllerError>(())
        };
        self.logged(format!("install flow {flow_id} on node {node_id}"), fut).await
    }

    /// Remove a flow from the config tree
    pub async fn delete_flow(&self, node_id: &str, flow_id: &str) -> Result<(), ControllerError> {
        let fut = async {
            let url = self.flow_url(node_id, flow_id);
            tracing::trace!("DELETE {url}");
            self.send(self.request(Method::DELETE, &url), &url).await?;
            tracing::info!("flow {flow_id} deleted from node {node_id}");
            Ok::<_, ControllerError>(())
        };
        self.logged(format!("delete flow {flow_id} from node {node_id}"), fut).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OdlController {
        OdlController::new(ControllerConfig::new("localhost", 8181, "admin", "admin")).unwrap()
    }

    #[test]
    fn test_read_urls() {
        let c = controller();
        assert_eq!(c.base_url(), "http://localhost:8181/restconf");
        assert_eq!(c.topology_url(), "http://localhost:8181/restconf/operational/network-topology:network-topology");
        assert_eq!(c.nodes_url(), "http://localhost:8181/restconf/operational/opendaylight-inventory:nodes");
        assert_eq!(c.node_url("openflow:1"), "http://localhost:8181/restconf/operational/opendaylight-inventory:nodes/node/openflow:1");
        assert_eq!(
            c.node_connectors_url("openflow:1"),
            "http://localhost:8181/restconf/operational/opendaylight-inventory:nodes/node/openflow:1/node-connector"
        );
        assert_eq!(
            c.flow_table_url("openflow:1"),
            "http://localhost:8181/restconf/operational/opendaylight-inventory:nodes/node/openflow:1/flow-node-inventory:table/0"
        );
    }

    #[test]
    fn test_flow_url() {
        let c = controller();
        assert_eq!(
            c.flow_url("openflow:1", "flow-to-10-0-0-2"),
            "http://localhost:8181/restconf/config/opendaylight-inventory:nodes/node/openflow:1/flow-node-inventory:table/0/flow/flow-to-10-0-0-2"
        );
        // ids are kept as a single path segment
        assert!(c.flow_url("openflow:1", "a/b#c").ends_with("/flow/a%2Fb%23c"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let res = OdlController::new(ControllerConfig::new("bad host", 8181, "admin", "admin"));
        assert!(matches!(res, Err(ControllerError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn test_install_flow_id_mismatch_sends_nothing() {
        // nothing listens on the port, a request would come back as a transport error
        let c = OdlController::new(ControllerConfig::new("127.0.0.1", 1, "admin", "admin")).unwrap();
        let err = c.install_flow("openflow:1", "some-other-id", &FlowConfig::example()).await.unwrap_err();
        match err {
            ControllerError::FlowIdMismatch { path_id, body_ids } => {
                assert_eq!(path_id, "some-other-id");
                assert_eq!(body_ids, vec!["flow-to-10-0-0-2".to_string()]);
            }
            other => panic!("unexpected error {other}"),
        }
        let err = c.install_flow("openflow:1", "x", &FlowConfig { flow: vec![] }).await.unwrap_err();
        assert!(matches!(err, ControllerError::FlowIdMismatch { .. }));
    }
}
