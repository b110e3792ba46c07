use std::sync::Arc;
use std::time::Duration;

use crate::connector::{Connector, SimpleConnector};
use crate::coordinator::{ClusterDiscovery, Coordinator, ConsumerLock, ZkCoordinator};
use crate::error::{Error, Result};
use crate::identity::ClientIdentity;
use crate::message::Message;
use crate::options::ConnectorOptions;

/// Cluster-aware supervisor: composes the coordinator adapter, cluster
/// discovery, and consumer lock around a lazily (re)constructed
/// [`SimpleConnector`], retrying and reconnecting across server failover.
pub struct ClusterConnector {
    destination: String,
    identity_template: ClientIdentity,
    options: ConnectorOptions,
    coordinator: Arc<dyn Coordinator>,
    discovery: Option<ClusterDiscovery>,
    lock: ConsumerLock,
    inner: Option<SimpleConnector>,
}

impl ClusterConnector {
    /// Connects to the coordinator and prepares the consumer lock for `destination`.
    pub fn new(
        destination: impl Into<String>,
        coordinator_servers: &str,
        session_timeout: Duration,
        options: ConnectorOptions,
    ) -> Result<Self> {
        let coordinator: Arc<dyn Coordinator> =
            Arc::new(ZkCoordinator::connect(coordinator_servers, session_timeout)?);
        Self::with_coordinator(destination, coordinator, options)
    }

    /// Builds a supervisor around an already-connected coordinator client.
    /// Exposed so tests (and alternative coordinator backends) can bypass
    /// the ZooKeeper-specific constructor above.
    pub fn with_coordinator(
        destination: impl Into<String>,
        coordinator: Arc<dyn Coordinator>,
        options: ConnectorOptions,
    ) -> Result<Self> {
        let destination = destination.into();
        let lock = ConsumerLock::new(coordinator.clone(), &destination)?;
        let identity_template =
            ClientIdentity::new(destination.clone()).with_filter(options.filter.clone());

        Ok(Self {
            destination,
            identity_template,
            options,
            coordinator,
            discovery: None,
            lock,
            inner: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }

    fn ensure_discovery(&mut self) -> Result<()> {
        if self.discovery.is_none() {
            self.discovery = Some(ClusterDiscovery::init(
                self.coordinator.clone(),
                self.destination.clone(),
            )?);
        }
        Ok(())
    }

    /// Acquires the lock, resolves the running node, and opens one
    /// `SimpleConnector` against it. A single attempt — callers wanting the
    /// bounded retry loop go through [`Self::supervised`].
    fn establish(&mut self) -> Result<()> {
        self.lock.acquire()?;
        self.ensure_discovery()?;

        let address = self
            .discovery
            .as_ref()
            .expect("ensure_discovery just initialized this")
            .get_node()?;

        let mut connector =
            SimpleConnector::new(address, self.identity_template.clone(), self.options.clone());
        connector.connect()?;
        self.inner = Some(connector);
        Ok(())
    }

    /// Disconnects and drops the current session, logging (not propagating)
    /// any close failure.
    fn teardown(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            if let Err(err) = inner.disconnect() {
                tracing::warn!(error = %err, "disconnect during teardown failed");
            }
        }
    }

    /// Runs `op` against the live session, reconnecting (lock + discovery +
    /// handshake) between failed attempts, up to `retry_times` total
    /// attempts.
    fn supervised<T>(&mut self, mut op: impl FnMut(&mut SimpleConnector) -> Result<T>) -> Result<T> {
        for attempt in 0..self.options.retry_times {
            if attempt > 0 {
                std::thread::sleep(self.options.retry_interval);
            }

            if self.inner.is_none() {
                if let Err(err) = self.establish() {
                    tracing::warn!(error = %err, attempt, "reconnect attempt failed");
                    continue;
                }
            }

            let inner = self.inner.as_mut().expect("established above");
            match op(inner) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(error = %err, attempt, "supervised operation failed");
                    self.teardown();
                }
            }
        }
        tracing::error!(
            destination = %self.destination,
            retry_times = self.options.retry_times,
            "supervised operation exhausted its retries"
        );
        Err(Error::OverRetryTimes)
    }
}

impl Connector for ClusterConnector {
    fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.supervised(|_inner| Ok(()))?;
        tracing::info!(destination = %self.destination, "cluster connector ready");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.teardown();
        Ok(())
    }

    fn subscribe(&mut self, filter: &str) -> Result<()> {
        let filter = filter.to_string();
        self.supervised(move |inner| inner.subscribe(&filter))
    }

    fn unsubscribe(&mut self) -> Result<()> {
        self.supervised(|inner| inner.unsubscribe())
    }

    fn get(&mut self, batch_size: i32, timeout: i64) -> Result<Message> {
        self.supervised(move |inner| inner.get(batch_size, timeout))
    }

    fn get_without_ack(&mut self, batch_size: i32, timeout: i64) -> Result<Message> {
        self.supervised(move |inner| inner.get_without_ack(batch_size, timeout))
    }

    fn ack(&mut self, batch_id: i64) -> Result<()> {
        self.supervised(move |inner| inner.ack(batch_id))
    }

    fn rollback(&mut self, batch_id: i64) -> Result<()> {
        self.supervised(move |inner| inner.rollback(batch_id))
    }
}
