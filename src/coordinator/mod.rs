//! Coordinator client adapter: the primitives the rest of the crate needs
//! from a ZooKeeper-compatible hierarchical namespace.

pub mod discovery;
pub mod lock;

pub use discovery::ClusterDiscovery;
pub use lock::ConsumerLock;

use std::sync::mpsc;
use std::time::Duration;

use zookeeper::{Acl, CreateMode, WatchedEvent, WatchedEventType, Watcher, ZkError, ZooKeeper};

use crate::error::{Error, Result};

/// What the rest of the crate needs from the coordinator: create-if-absent
/// paths, children (+watch), ephemeral-sequential create, and wait-for-delete.
pub trait Coordinator: Send + Sync {
    fn ensure_path(&self, path: &str) -> Result<()>;
    fn create_ephemeral_sequential(&self, parent: &str) -> Result<String>;
    fn children(&self, path: &str) -> Result<Vec<String>>;
    fn children_and_watch(&self, path: &str) -> Result<Vec<String>>;
    fn wait_delete(&self, path: &str) -> Result<()>;
    fn get_data(&self, path: &str) -> Result<Vec<u8>>;
}

/// One-shot watcher that forwards the single event it receives over a channel.
struct ChannelWatcher(mpsc::Sender<WatchedEvent>);

impl Watcher for ChannelWatcher {
    fn handle(&self, event: WatchedEvent) {
        let _ = self.0.send(event);
    }
}

/// Session-wide watcher used only for connection-level logging.
struct LoggingWatcher;

impl Watcher for LoggingWatcher {
    fn handle(&self, event: WatchedEvent) {
        tracing::debug!(?event, "coordinator session event");
    }
}

/// [`Coordinator`] backed by a real ZooKeeper-compatible session.
pub struct ZkCoordinator {
    zk: ZooKeeper,
}

impl ZkCoordinator {
    pub fn connect(servers: &str, session_timeout: Duration) -> Result<Self> {
        let zk = ZooKeeper::connect(servers, session_timeout, LoggingWatcher)?;
        Ok(Self { zk })
    }
}

impl Coordinator for ZkCoordinator {
    fn ensure_path(&self, path: &str) -> Result<()> {
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);
            match self
                .zk
                .create(&prefix, vec![], Acl::open_unsafe().clone(), CreateMode::Persistent)
            {
                Ok(_) | Err(ZkError::NodeExists) => {}
                Err(err) => return Err(Error::from(err)),
            }
        }
        Ok(())
    }

    fn create_ephemeral_sequential(&self, parent: &str) -> Result<String> {
        let created = self.zk.create(
            &format!("{parent}/"),
            vec![0u8],
            Acl::open_unsafe().clone(),
            CreateMode::EphemeralSequential,
        )?;
        let basename = created
            .rsplit('/')
            .next()
            .ok_or_else(|| Error::library_bug("ephemeral sequential path has no basename"))?;
        Ok(basename.to_string())
    }

    fn children(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.zk.get_children(path, false)?)
    }

    fn children_and_watch(&self, path: &str) -> Result<Vec<String>> {
        let (tx, _rx) = mpsc::channel();
        Ok(self.zk.get_children_w(path, ChannelWatcher(tx))?)
    }

    fn wait_delete(&self, path: &str) -> Result<()> {
        loop {
            let (tx, rx) = mpsc::channel();
            let exists = self.zk.exists_w(path, ChannelWatcher(tx))?;
            if exists.is_none() {
                return Ok(());
            }

            let event = rx
                .recv()
                .map_err(|_| Error::Coordinator("watch channel closed before an event arrived".into()))?;

            if event.event_type == WatchedEventType::NodeDeleted {
                std::thread::sleep(Duration::from_secs(10));
            }
            // Any other event type re-arms immediately by looping back.
        }
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.zk.get_data(path, false)?.0)
    }
}
