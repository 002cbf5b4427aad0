use std::fmt;
use std::fmt::Formatter;
use serde::{Deserialize, Serialize};
use crate::{lenient_items, null_as_default};

/// The body of `operational/network-topology:network-topology`. Nothing is cached between reads,
/// every poll of the controller produces a fresh document.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NetworkTopologyDocument {
    #[serde(rename = "network-topology", default, deserialize_with = "null_as_default")]
    pub network_topology: NetworkTopology,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct NetworkTopology {
    #[serde(default, deserialize_with = "null_as_default")]
    pub topology: Vec<TopologyEntry>,
}

/// One named topology instance (e.g. `flow:1`), each with its own nodes and links
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct TopologyEntry {
    #[serde(rename = "topology-id", default)]
    pub topology_id: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub node: Vec<TopologyNode>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub link: Vec<TopologyLink>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct TopologyNode {
    #[serde(rename = "node-id", default)]
    pub node_id: String,
    #[serde(rename = "termination-point", default, deserialize_with = "lenient_items")]
    pub termination_point: Vec<TerminationPoint>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct TerminationPoint {
    #[serde(rename = "tp-id", default)]
    pub tp_id: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct TopologyLink {
    #[serde(rename = "link-id", default)]
    pub link_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: LinkSource,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: LinkDestination,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct LinkSource {
    #[serde(rename = "source-node", default)]
    pub source_node: String,
    #[serde(rename = "source-tp", default)]
    pub source_tp: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct LinkDestination {
    #[serde(rename = "dest-node", default)]
    pub dest_node: String,
    #[serde(rename = "dest-tp", default)]
    pub dest_tp: String,
}

impl TopologyEntry {
    /// An entry counts as discovered once it has at least one node and at least one link
    pub fn is_ready(&self) -> bool {
        !self.node.is_empty() && !self.link.is_empty()
    }
}

impl NetworkTopologyDocument {
    pub fn entries(&self) -> &[TopologyEntry] {
        &self.network_topology.topology
    }

    /// Returns the first topology entry that is ready. Entries are looked at independently, one
    /// ready entry is enough regardless of what the others contain.
    pub fn ready_entry(&self) -> Option<&TopologyEntry> {
        self.entries().iter().find(|entry| entry.is_ready())
    }
}

impl fmt::Display for NetworkTopologyDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    fn parse(value: serde_json::Value) -> NetworkTopologyDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ready_entry_needs_nodes_and_links() {
        let doc = parse(json!({
            "network-topology": {
                "topology": [
                    {"topology-id": "flow:1", "node": [{"node-id": "openflow:1"}]},
                    {"topology-id": "flow:2", "link": [{"link-id": "l1"}]},
                ]
            }
        }));
        assert_eq!(doc.entries().len(), 2);
        assert!(doc.ready_entry().is_none());
    }

    #[test]
    fn test_single_ready_entry_is_enough() {
        let doc = parse(json!({
            "network-topology": {
                "topology": [
                    {"topology-id": "empty"},
                    {
                        "topology-id": "flow:1",
                        "node": [{"node-id": "openflow:1"}, {"node-id": "openflow:2"}],
                        "link": [{
                            "link-id": "openflow:1:2",
                            "source": {"source-node": "openflow:1", "source-tp": "openflow:1:2"},
                            "destination": {"dest-node": "openflow:2", "dest-tp": "openflow:2:1"}
                        }]
                    },
                ]
            }
        }));
        let ready = doc.ready_entry().unwrap();
        assert_eq!(ready.topology_id, "flow:1");
        assert_eq!(ready.node.len(), 2);
        assert_eq!(ready.link[0].destination.dest_node, "openflow:2");
    }

    #[test]
    fn test_missing_keys_are_not_ready() {
        assert!(parse(json!({})).ready_entry().is_none());
        assert!(parse(json!({"network-topology": {}})).ready_entry().is_none());
        assert!(parse(json!({"network-topology": null})).ready_entry().is_none());
        let doc = parse(json!({"network-topology": {"topology": [{"topology-id": "flow:1", "node": null, "link": null}]}}));
        assert_eq!(doc.entries().len(), 1);
        assert!(doc.ready_entry().is_none());
    }

    #[test]
    fn test_odd_items_still_count() {
        let doc = parse(json!({
            "network-topology": {
                "topology": [{
                    "topology-id": "t",
                    "node": ["openflow:1", {"node-id": "openflow:2", "termination-point": [7]}],
                    "link": [{"link-id": "l", "source": null}, 42]
                }]
            }
        }));
        let ready = doc.ready_entry().unwrap();
        assert_eq!(ready.node.len(), 2);
        assert_eq!(ready.node[0], TopologyNode::default());
        assert_eq!(ready.node[1].node_id, "openflow:2");
        assert_eq!(ready.node[1].termination_point.len(), 1);
        assert_eq!(ready.link.len(), 2);
        assert_eq!(ready.link[0].link_id, "l");
        assert_eq!(ready.link[0].source, LinkSource::default());
    }

    #[test]
    fn test_unexpected_shape_is_an_error() {
        let res: Result<NetworkTopologyDocument, _> = serde_json::from_value(json!({"network-topology": {"topology": "nope"}}));
        assert!(res.is_err());
    }
}
