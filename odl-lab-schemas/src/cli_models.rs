use std::net::Ipv4Addr;
use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version = "1.0", author = "Bristol Cyber Security Group (BCSG)", about = "Drive an OpenDaylight controller for the SDN lab")]
pub struct Opts {
    #[arg(long, help = "Lab config file, defaults to ./odl-lab.json when present")]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub verbosity: Option<String>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub sub_command: SubCommand,
}

/// Connection settings that override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, help = "Controller host")]
    pub host: Option<String>,
    #[arg(long, help = "Controller Restconf port")]
    pub port: Option<u16>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long, help = "Per request timeout in seconds")]
    pub request_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    #[command(about = "Wait until the controller has discovered switches and links")]
    Wait(WaitCmd),
    #[command(about = "Print the operational network topology")]
    Topology,
    #[command(about = "Print the node inventory")]
    Nodes,
    #[command(about = "Print the connectors (ports) of a node")]
    Connectors(NodeArg),
    #[command(about = "Print the flows in table 0 of a node")]
    Flows(NodeArg),
    #[command(about = "Print port statistics of a node")]
    Stats(NodeArg),
    #[command(about = "Install a flow sending IPv4 traffic for a destination out of a port")]
    InstallFlow(InstallFlowCmd),
    #[command(about = "Delete a flow from table 0 of a node")]
    DeleteFlow(DeleteFlowCmd),
    #[command(about = "Wait for discovery, inspect the first node and install then delete the example flow")]
    Demo(WaitCmd),
}

impl SubCommand {
    pub fn name(&self) -> String {
        match &self {
            SubCommand::Wait(_) => "wait".into(),
            SubCommand::Topology => "topology".into(),
            SubCommand::Nodes => "nodes".into(),
            SubCommand::Connectors(_) => "connectors".into(),
            SubCommand::Flows(_) => "flows".into(),
            SubCommand::Stats(_) => "stats".into(),
            SubCommand::InstallFlow(_) => "install flow".into(),
            SubCommand::DeleteFlow(_) => "delete flow".into(),
            SubCommand::Demo(_) => "demo".into(),
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitCmd {
    #[arg(long, help = "Seconds to wait for discovery, overrides the config file")]
    pub timeout: Option<u64>,
    #[arg(long, help = "Seconds between topology polls, overrides the config file")]
    pub poll_interval: Option<u64>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NodeArg {
    #[arg(help = "Inventory node id, i.e. openflow:1")]
    pub node: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InstallFlowCmd {
    #[arg(help = "Inventory node id, i.e. openflow:1")]
    pub node: String,
    #[arg(long, default_value = "10.0.0.2")]
    pub destination: Ipv4Addr,
    #[arg(long, default_value_t = 2, help = "Port number the matching traffic is sent out of")]
    pub output_port: u32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeleteFlowCmd {
    #[arg(help = "Inventory node id, i.e. openflow:1")]
    pub node: String,
    #[arg(help = "Flow id, i.e. flow-to-10-0-0-2")]
    pub flow_id: String,
}
