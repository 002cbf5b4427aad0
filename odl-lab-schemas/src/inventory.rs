use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::null_as_default;

/// Body of `operational/opendaylight-inventory:nodes`
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NodesDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Nodes,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct Nodes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub node: Vec<InventoryNode>,
}

/// Body of `operational/opendaylight-inventory:nodes/node/{id}`, the controller wraps the single
/// node in a list
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NodeDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub node: Vec<InventoryNode>,
}

/// A switch as seen by the inventory. Fields we do not model (hardware, flow tables, meters ...)
/// are kept in `other` so printing the node does not lose information.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct InventoryNode {
    pub id: String,
    #[serde(rename = "node-connector", default, deserialize_with = "null_as_default")]
    pub node_connector: Vec<NodeConnector>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Body of `operational/opendaylight-inventory:nodes/node/{id}/node-connector`
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NodeConnectorDocument {
    #[serde(rename = "node-connector", default, deserialize_with = "null_as_default")]
    pub node_connector: Vec<NodeConnector>,
}

/// A switch port
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NodeConnector {
    pub id: String,
    // the controller reports "LOCAL" for the internal port, numbers otherwise
    #[serde(rename = "flow-node-inventory:port-number", default, skip_serializing_if = "Option::is_none")]
    pub port_number: Option<Value>,
    #[serde(rename = "flow-node-inventory:name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "opendaylight-port-statistics:flow-capable-node-connector-statistics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub statistics: Option<PortStatistics>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PortStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Counters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets: Option<Counters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_drops: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmit_drops: Option<u64>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    #[serde(default)]
    pub received: u64,
    #[serde(default)]
    pub transmitted: u64,
}

/// Body of `operational/opendaylight-inventory:nodes/node/{id}/flow-node-inventory:table/0`
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct FlowTableDocument {
    #[serde(rename = "flow-node-inventory:table", default, deserialize_with = "null_as_default")]
    pub table: Vec<FlowTable>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct FlowTable {
    #[serde(default)]
    pub id: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flow: Vec<FlowEntry>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A flow as reported by the operational tree, including statistics and anything else the
/// controller adds on top of what was written to the config tree
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct FlowEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<u8>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl NodesDocument {
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.node.iter().map(|n| n.id.as_str()).collect()
    }
}

impl NodeConnector {
    pub fn bytes(&self) -> Option<Counters> {
        self.statistics.as_ref().and_then(|s| s.bytes)
    }

    pub fn packets(&self) -> Option<Counters> {
        self.statistics.as_ref().and_then(|s| s.packets)
    }
}

impl FlowTableDocument {
    pub fn flows(&self) -> impl Iterator<Item = &FlowEntry> {
        self.table.iter().flat_map(|t| t.flow.iter())
    }

    pub fn contains_flow(&self, flow_id: &str) -> bool {
        self.flows().any(|f| f.id == flow_id)
    }
}
