use std::future::Future;
use anyhow::{bail, Context};
use odl_lab_schemas::cli_models::{DeleteFlowCmd, InstallFlowCmd, WaitCmd};
use odl_lab_schemas::flow::FlowConfig;
use odl_lab_schemas::inventory::NodeConnector;
use odl_lab_schemas::settings::DiscoveryConfig;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use crate::controller::OdlController;
use crate::discovery::{DiscoveredTopology, DiscoveryWaiter};
use crate::poll::PollOutcome;

/// Discovery settings from the config file with the `wait` flags applied on top
pub fn discovery_config(config: &DiscoveryConfig, cmd: &WaitCmd) -> DiscoveryConfig {
    DiscoveryConfig {
        timeout_secs: cmd.timeout.unwrap_or(config.timeout_secs),
        poll_interval_secs: cmd.poll_interval.unwrap_or(config.poll_interval_secs),
    }
}

/// Run a command until it finishes or `cancel` fires, whichever comes first. Requests that hang
/// on a stalled controller are dropped on cancel.
pub async fn until_cancelled<T>(
    cancel: &CancellationToken,
    command: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::select! {
        result = command => result,
        _ = cancel.cancelled() => bail!("interrupted"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Wait for the controller to discover the lab, an error unless discovery completed
pub async fn wait_action(
    controller: &OdlController,
    discovery: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<DiscoveredTopology> {
    let outcome = DiscoveryWaiter::from_config(discovery)
        .wait(controller, cancel)
        .await;
    match outcome {
        PollOutcome::Ready { value, .. } => Ok(value),
        PollOutcome::TimedOut { attempts, .. } => {
            bail!("topology discovery timed out after {}s and {attempts} polls", discovery.timeout_secs)
        }
        PollOutcome::Cancelled { .. } => bail!("topology discovery was cancelled"),
    }
}

pub async fn topology_action(controller: &OdlController) -> anyhow::Result<()> {
    let topology = controller.get_topology().await.context("reading topology")?;
    print_json(&topology)
}

pub async fn nodes_action(controller: &OdlController) -> anyhow::Result<()> {
    let nodes = controller.get_nodes().await.context("reading node inventory")?;
    print_json(&nodes)
}

pub async fn connectors_action(controller: &OdlController, node_id: &str) -> anyhow::Result<()> {
    let connectors = controller.get_node_connectors(node_id).await
        .with_context(|| format!("reading connectors of {node_id}"))?;
    print_json(&connectors)
}

pub async fn flows_action(controller: &OdlController, node_id: &str) -> anyhow::Result<()> {
    let flows = controller.get_flows(node_id).await
        .with_context(|| format!("reading flows of {node_id}"))?;
    print_json(&flows)
}

/// One line per port, `-` where the controller has no counters for it
pub fn format_port_statistics(ports: &[NodeConnector]) -> Vec<String> {
    let count = |v: Option<u64>| v.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
    ports.iter()
        .map(|port| {
            let bytes = port.bytes();
            let packets = port.packets();
            format!(
                "{} rx_bytes={} tx_bytes={} rx_packets={} tx_packets={}",
                port.id,
                count(bytes.map(|b| b.received)),
                count(bytes.map(|b| b.transmitted)),
                count(packets.map(|p| p.received)),
                count(packets.map(|p| p.transmitted)),
            )
        })
        .collect()
}

pub async fn stats_action(controller: &OdlController, node_id: &str) -> anyhow::Result<()> {
    let ports = controller.get_node_statistics(node_id).await
        .with_context(|| format!("reading port statistics of {node_id}"))?;
    for line in format_port_statistics(&ports) {
        println!("{line}");
    }
    Ok(())
}

/// Install a destination flow, returns the flow id that was written
pub async fn install_flow_action(controller: &OdlController, cmd: &InstallFlowCmd) -> anyhow::Result<String> {
    let flow = FlowConfig::ipv4_destination_to_port(cmd.destination, cmd.output_port);
    let flow_id = flow.first_id().context("flow config has no flow")?.to_string();
    tracing::debug!("flow body:\n{flow}");
    controller.install_flow(&cmd.node, &flow_id, &flow).await
        .with_context(|| format!("installing flow {flow_id} on {}", cmd.node))?;
    Ok(flow_id)
}

pub async fn delete_flow_action(controller: &OdlController, cmd: &DeleteFlowCmd) -> anyhow::Result<()> {
    controller.delete_flow(&cmd.node, &cmd.flow_id).await
        .with_context(|| format!("deleting flow {} from {}", cmd.flow_id, cmd.node))?;
    Ok(())
}

/// What the demo run saw and did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub discovered: Option<DiscoveredTopology>,
    pub node_count: usize,
    pub first_node: Option<String>,
    pub connectors: Option<usize>,
    pub flows: Option<usize>,
    pub installed_flow: Option<String>,
    pub deleted_flow: bool,
}

/// The lab walkthrough: wait for discovery, look at the inventory and round-trip the example
/// flow through the first node. Individual reads that fail are logged and skipped, the run only
/// fails when discovery does not complete.
pub async fn demo_action(
    controller: &OdlController,
    discovery: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<DemoReport> {
    let mut report = DemoReport::default();
    let discovered = wait_action(controller, discovery, cancel).await
        .context("topology discovery failed")?;
    report.discovered = Some(discovered);

    if controller.get_topology().await.is_ok() {
        tracing::info!("retrieved topology successfully");
    }

    let nodes = match controller.get_nodes().await {
        Ok(nodes) => nodes,
        Err(_) => return Ok(report),
    };
    report.node_count = nodes.nodes.node.len();
    tracing::info!("found {} nodes", report.node_count);
    let node_id = match nodes.node_ids().first() {
        Some(id) => id.to_string(),
        None => return Ok(report),
    };
    tracing::info!("getting details for node {node_id}");
    report.first_node = Some(node_id.clone());

    if let Ok(connectors) = controller.get_node_connectors(&node_id).await {
        tracing::info!("retrieved {} connectors for node {node_id}", connectors.len());
        report.connectors = Some(connectors.len());
    }
    if let Ok(flows) = controller.get_flows(&node_id).await {
        tracing::info!("retrieved {} flows for node {node_id}", flows.flows().count());
        report.flows = Some(flows.flows().count());
    }

    let example = FlowConfig::example();
    let flow_id = example.first_id().context("example flow has no id")?.to_string();
    if controller.install_flow(&node_id, &flow_id, &example).await.is_ok() {
        tracing::info!("example flow installed successfully");
        report.installed_flow = Some(flow_id.clone());
        if controller.delete_flow(&node_id, &flow_id).await.is_ok() {
            tracing::info!("example flow deleted successfully");
            report.deleted_flow = true;
        }
    }
    Ok(report)
}
