use async_trait::async_trait;
use odl_lab_schemas::settings::DiscoveryConfig;
use odl_lab_schemas::topology::NetworkTopologyDocument;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};
use crate::controller::OdlController;
use crate::error::ControllerError;
use crate::poll::{poll_until, PollOutcome, PollPolicy};

/// Anything that can hand out a fresh topology snapshot
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch_topology(&self) -> Result<NetworkTopologyDocument, ControllerError>;
}

#[async_trait]
impl TopologySource for OdlController {
    async fn fetch_topology(&self) -> Result<NetworkTopologyDocument, ControllerError> {
        self.get_topology().await
    }
}

/// Summary of the topology entry that satisfied discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTopology {
    pub topology_id: String,
    pub nodes: usize,
    pub links: usize,
}

pub type DiscoveryOutcome = PollOutcome<DiscoveredTopology>;

/// Blocks the caller until the controller reports a topology entry with at least one node and one
/// link, or the timeout passes. Failed reads are logged and polled again, they never end the wait.
#[derive(Debug, Clone)]
pub struct DiscoveryWaiter {
    policy: PollPolicy,
    span: Span,
}

impl DiscoveryWaiter {
    pub fn new(policy: PollPolicy) -> Self {
        let span = tracing::info_span!(
            "topology_discovery",
            timeout_secs = policy.timeout.as_secs_f64(),
            poll_interval_secs = policy.poll_interval.as_secs_f64(),
        );
        Self::with_span(policy, span)
    }

    pub fn with_span(policy: PollPolicy, span: Span) -> Self {
        Self { policy, span }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(PollPolicy::from(config))
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub async fn wait<S>(&self, source: &S, cancel: &CancellationToken) -> DiscoveryOutcome
    where
        S: TopologySource + ?Sized,
    {
        let timeout = self.policy.timeout;
        async move {
            tracing::info!("waiting for topology discovery (timeout: {}s)", timeout.as_secs_f64());
            let outcome = poll_until(self.policy, cancel, |attempt| async move {
                let topology = match source.fetch_topology().await {
                    Ok(topology) => topology,
                    Err(err) => {
                        tracing::warn!("could not retrieve topology on attempt {attempt}, retrying: {err}");
                        return None;
                    }
                };
                match topology.ready_entry() {
                    Some(entry) => Some(DiscoveredTopology {
                        topology_id: entry.topology_id.clone(),
                        nodes: entry.node.len(),
                        links: entry.link.len(),
                    }),
                    None => {
                        tracing::info!("topology discovery in progress...");
                        None
                    }
                }
            }).await;
            match &outcome {
                PollOutcome::Ready { value, .. } => tracing::info!(
                    "topology discovery complete, found {} nodes and {} links in {}",
                    value.nodes, value.links, value.topology_id
                ),
                PollOutcome::TimedOut { attempts, .. } => tracing::warn!(
                    "topology discovery timed out after {}s ({attempts} polls)",
                    timeout.as_secs_f64()
                ),
                PollOutcome::Cancelled { attempts, .. } => tracing::warn!(
                    "topology discovery cancelled after {attempts} polls"
                ),
            }
            outcome
        }
        .instrument(self.span.clone())
        .await
    }
}

impl OdlController {
    /// Wait for discovery with the given policy, true once a ready topology entry was seen
    pub async fn wait_for_topology_discovery(&self, policy: PollPolicy) -> bool {
        DiscoveryWaiter::new(policy)
            .wait(self, &CancellationToken::new())
            .await
            .is_ready()
    }
}
