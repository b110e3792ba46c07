//! Connector facades: a single-server session and a cluster-aware
//! supervisor around it.

pub mod cluster;
pub mod simple;

pub use cluster::ClusterConnector;
pub use simple::SimpleConnector;

use crate::error::Result;
use crate::message::Message;

/// Common surface shared by [`SimpleConnector`] and [`ClusterConnector`].
pub trait Connector {
    fn connect(&mut self) -> Result<()>;
    fn disconnect(&mut self) -> Result<()>;
    fn subscribe(&mut self, filter: &str) -> Result<()>;
    fn unsubscribe(&mut self) -> Result<()>;
    fn get(&mut self, batch_size: i32, timeout: i64) -> Result<Message>;
    fn get_without_ack(&mut self, batch_size: i32, timeout: i64) -> Result<Message>;
    fn ack(&mut self, batch_id: i64) -> Result<()>;
    fn rollback(&mut self, batch_id: i64) -> Result<()>;
}
