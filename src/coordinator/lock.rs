//! Distributed consumer lock: a fair queue of ephemeral-sequential children
//! under `/canal-consumer/<destination>`.

use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::error::Result;

/// Fair lock for one destination: at most one holder at a time, FIFO by the
/// coordinator-assigned sequence number.
pub struct ConsumerLock {
    coordinator: Arc<dyn Coordinator>,
    path: String,
    sequence: Option<String>,
}

impl ConsumerLock {
    pub fn new(coordinator: Arc<dyn Coordinator>, destination: &str) -> Result<Self> {
        let path = format!("/canal-consumer/{destination}");
        coordinator.ensure_path(&path)?;
        Ok(Self {
            coordinator,
            path,
            sequence: None,
        })
    }

    /// Blocks until this instance holds the lock.
    pub fn acquire(&mut self) -> Result<()> {
        loop {
            let mut children = self.coordinator.children(&self.path)?;

            if self.sequence.is_none() {
                let basename = self.coordinator.create_ephemeral_sequential(&self.path)?;
                self.sequence = Some(basename);
                children = self.coordinator.children(&self.path)?;
            }

            let mine = self
                .sequence
                .clone()
                .expect("sequence was just set above if missing");

            if !children.iter().any(|c| c == &mine) {
                // Lost mid-flight (session churn, external eviction): recreate.
                self.sequence = None;
                continue;
            }

            children.sort();
            if children.first() == Some(&mine) {
                return Ok(());
            }

            let position = children
                .iter()
                .position(|c| c == &mine)
                .expect("checked present above");
            let prev = &children[position - 1];
            self.coordinator
                .wait_delete(&format!("{}/{}", self.path, prev))?;
        }
    }

    /// This instance's position in the fair queue, once acquired or pending.
    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }
}
