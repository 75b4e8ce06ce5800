//! Replication group configuration.
//!
//! # Flow
//!
//! ```text
//! ConnectionSpec ──► ClusterConfigurator::build ──► ResolvedClusterConfig
//!                          │                               │
//!                          ▼                               ▼
//!                  StrategyRegistry              ClientConfig / redis::Client
//! ```
//!
//! The node list is the only required input. Everything else has a default
//! and is passed through unchanged; the cache-client runtime owns pooling,
//! topology polling and retries.

mod config;
mod configurator;
mod connection;
mod node;

pub use config::{
    ConfigSummary, ConnectionSpec, NodeList, ReadMode, ResolvedClusterConfig, DEFAULT_DATABASE,
    DEFAULT_MASTER_CONN_POOL_SIZE, DEFAULT_NODE_POLL_INTERVAL_MS, DEFAULT_PING_TIMEOUT_MS,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_INTERVAL_MS, DEFAULT_SLAVE_CONN_POOL_SIZE,
    DEFAULT_TIMEOUT_MS,
};
pub use configurator::ClusterConfigurator;
pub use node::{parse_nodes, NodeAddress, NODES_FORMAT_HINT};
