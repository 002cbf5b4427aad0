use std::fmt;
use std::fmt::Formatter;
use std::net::Ipv4Addr;
use serde::{Deserialize, Serialize};

/// Ethernet type for IPv4 traffic
pub const ETHERTYPE_IPV4: u16 = 2048;
pub const DEFAULT_FLOW_PRIORITY: u16 = 100;
/// Flows are only ever written to and read from table 0
pub const DEFAULT_TABLE_ID: u8 = 0;

/// The body written to
/// `config/opendaylight-inventory:nodes/node/{id}/flow-node-inventory:table/0/flow/{flow_id}`.
/// It is built without looking at the live topology, nothing here checks that the node or the
/// output port exist.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub flow: Vec<Flow>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub id: String,
    pub priority: u16,
    pub table_id: u8,
    #[serde(rename = "match")]
    pub flow_match: FlowMatch,
    pub instructions: Instructions,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FlowMatch {
    pub ethernet_match: EthernetMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_destination: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EthernetMatch {
    pub ethernet_type: EthernetType,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetType {
    #[serde(rename = "type")]
    pub ether_type: u16,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    pub instruction: Vec<Instruction>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Instruction {
    pub order: u32,
    pub apply_actions: ApplyActions,
}

/// Actions are applied in list order
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApplyActions {
    pub action: Vec<Action>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Action {
    pub order: u32,
    pub output_action: OutputAction,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OutputAction {
    // the controller expects the port number as a string
    pub output_node_connector: String,
}

/// Flow id for traffic towards `destination`, dots are swapped for dashes so the id can sit in a
/// resource path, i.e. `10.0.0.2` becomes `flow-to-10-0-0-2`
pub fn derive_flow_id(destination: Ipv4Addr) -> String {
    format!("flow-to-{}", destination.to_string().replace('.', "-"))
}

impl FlowConfig {
    /// Single flow matching IPv4 traffic for `destination/32` and sending it out of
    /// `output_port`, at the default priority in table 0
    pub fn ipv4_destination_to_port(destination: Ipv4Addr, output_port: u32) -> Self {
        let flow = Flow {
            id: derive_flow_id(destination),
            priority: DEFAULT_FLOW_PRIORITY,
            table_id: DEFAULT_TABLE_ID,
            flow_match: FlowMatch {
                ethernet_match: EthernetMatch {
                    ethernet_type: EthernetType { ether_type: ETHERTYPE_IPV4 },
                },
                ipv4_destination: Some(format!("{destination}/32")),
            },
            instructions: Instructions {
                instruction: vec![Instruction {
                    order: 0,
                    apply_actions: ApplyActions {
                        action: vec![Action {
                            order: 0,
                            output_action: OutputAction {
                                output_node_connector: output_port.to_string(),
                            },
                        }],
                    },
                }],
            },
        };
        Self { flow: vec![flow] }
    }

    /// The flow the lab installs by default, traffic for h2 (10.0.0.2) out of port 2
    pub fn example() -> Self {
        Self::ipv4_destination_to_port(Ipv4Addr::new(10, 0, 0, 2), 2)
    }

    pub fn flow_ids(&self) -> Vec<&str> {
        self.flow.iter().map(|f| f.id.as_str()).collect()
    }

    /// Id of the first flow, which is the resource id to write this config under
    pub fn first_id(&self) -> Option<&str> {
        self.flow.first().map(|f| f.id.as_str())
    }
}

impl fmt::Display for FlowConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
