//! Client-side protocol engine and cluster-aware connection supervisor for
//! a binlog change-data-capture service.
//!
//! A [`connector::SimpleConnector`] owns one handshake-and-subscribe session
//! against a single server. A [`connector::ClusterConnector`] wraps that
//! with coordinator-backed failover: a fair [`coordinator::ConsumerLock`]
//! excludes other consumers of the same destination, [`coordinator::ClusterDiscovery`]
//! resolves which cluster member is currently serving it, and any transport
//! error triggers a bounded disconnect/reconnect/retry cycle.

pub mod connector;
pub mod constant;
pub mod coordinator;
pub mod error;
pub mod hash;
pub mod identity;
pub mod message;
pub mod options;
pub mod protocol;

pub use connector::{ClusterConnector, Connector, SimpleConnector};
pub use coordinator::{ClusterDiscovery, Coordinator, ConsumerLock, ZkCoordinator};
pub use error::{Error, Result};
pub use identity::ClientIdentity;
pub use message::{Entry, Message};
pub use options::ConnectorOptions;
