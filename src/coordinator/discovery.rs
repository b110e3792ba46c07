//! Cluster discovery: find the server currently serving a destination.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::coordinator::Coordinator;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RunningRecord {
    #[allow(dead_code)]
    cid: i64,
    address: String,
    #[allow(dead_code)]
    active: bool,
}

/// Tracks a destination's advertised cluster membership and resolves the
/// currently running server on demand.
pub struct ClusterDiscovery {
    coordinator: Arc<dyn Coordinator>,
    destination: String,
    /// Shuffled at init, never consulted by [`Self::get_node`]. Kept only as
    /// documented state for a possible future fallback when `/running` is
    /// absent; see the running-record lookup below.
    cluster_address: Vec<String>,
}

impl ClusterDiscovery {
    pub fn init(coordinator: Arc<dyn Coordinator>, destination: impl Into<String>) -> Result<Self> {
        let destination = destination.into();
        let cluster_path = format!("/otter/canal/destinations/{destination}/cluster");

        let mut cluster_address = coordinator.children_and_watch(&cluster_path)?;
        cluster_address.shuffle(&mut rand::thread_rng());

        Ok(Self {
            coordinator,
            destination,
            cluster_address,
        })
    }

    pub fn cluster_address(&self) -> &[String] {
        &self.cluster_address
    }

    /// Reads the running-server record fresh on every call; ignores
    /// `cluster_address` entirely.
    pub fn get_node(&self) -> Result<String> {
        let running_path = format!("/otter/canal/destinations/{}/running", self.destination);
        let data = self.coordinator.get_data(&running_path)?;
        let record: RunningRecord = serde_json::from_slice(&data)
            .map_err(|err| Error::Coordinator(format!("decoding running record: {err}")))?;
        Ok(record.address)
    }
}
