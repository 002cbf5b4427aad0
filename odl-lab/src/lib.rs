//! Client side of the OpenDaylight SDN lab: a Restconf client for topology, inventory and flow
//! operations, and a waiter that blocks until the controller has discovered the emulated network.

pub mod actions;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod poll;

pub use controller::OdlController;
pub use discovery::{DiscoveredTopology, DiscoveryOutcome, DiscoveryWaiter, TopologySource};
pub use error::ControllerError;
pub use poll::{poll_until, PollOutcome, PollPolicy};
