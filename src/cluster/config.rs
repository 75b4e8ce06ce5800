//! Connection settings for an ElastiCache replication group
//!
//! [`ConnectionSpec`] holds the user-supplied values, usually read from the
//! `[elasticache]` section of the settings file. [`ResolvedClusterConfig`] is
//! the validated, immutable result handed to the cache-client runtime.

use super::node::NodeAddress;
use crate::balancer::{LoadBalancer, DEFAULT_LOAD_BALANCER};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DATABASE: i64 = 0;
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_MASTER_CONN_POOL_SIZE: u32 = 100;
pub const DEFAULT_SLAVE_CONN_POOL_SIZE: u32 = 100;
pub const DEFAULT_NODE_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_WEIGHT: u32 = 1;

const REDACTED: &str = "***";

/// Node entries, either a whitespace-delimited string or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeList {
    Delimited(String),
    Listed(Vec<String>),
}

impl NodeList {
    /// Raw entries in input order. Blank entries are kept.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            NodeList::Delimited(nodes) => nodes.split_whitespace().collect(),
            NodeList::Listed(nodes) => nodes.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for NodeList {
    fn default() -> Self {
        NodeList::Delimited(String::new())
    }
}

impl From<&str> for NodeList {
    fn from(nodes: &str) -> Self {
        NodeList::Delimited(nodes.to_string())
    }
}

impl From<String> for NodeList {
    fn from(nodes: String) -> Self {
        NodeList::Delimited(nodes)
    }
}

impl From<Vec<String>> for NodeList {
    fn from(nodes: Vec<String>) -> Self {
        NodeList::Listed(nodes)
    }
}

/// User-supplied connection settings
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionSpec {
    /// Node addresses, e.g. "node1.com:6379 node2.com:6379"
    #[serde(default)]
    pub nodes: NodeList,

    /// Load balancer name; empty means the runtime default
    #[serde(default = "default_load_balancer")]
    pub load_balancer: String,

    #[serde(default = "default_database")]
    pub database: i64,

    #[serde(default)]
    pub password: Option<String>,

    /// Command response timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default = "default_master_connection_pool_size")]
    pub master_connection_pool_size: u32,

    #[serde(default = "default_slave_connection_pool_size")]
    pub slave_connection_pool_size: u32,

    /// Topology scan interval in milliseconds
    #[serde(default = "default_node_poll_interval_ms")]
    pub node_poll_interval_ms: u64,

    /// Per-node weights for `weighted_round_robin`, keyed by "host:port"
    #[serde(default)]
    pub weights: HashMap<String, u32>,

    /// Weight of nodes missing from `weights`
    #[serde(default = "default_weight")]
    pub default_weight: u32,
}

fn default_load_balancer() -> String {
    DEFAULT_LOAD_BALANCER.to_string()
}

fn default_database() -> i64 {
    DEFAULT_DATABASE
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_ping_timeout_ms() -> u64 {
    DEFAULT_PING_TIMEOUT_MS
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_master_connection_pool_size() -> u32 {
    DEFAULT_MASTER_CONN_POOL_SIZE
}

fn default_slave_connection_pool_size() -> u32 {
    DEFAULT_SLAVE_CONN_POOL_SIZE
}

fn default_node_poll_interval_ms() -> u64 {
    DEFAULT_NODE_POLL_INTERVAL_MS
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

impl Default for ConnectionSpec {
    fn default() -> Self {
        Self {
            nodes: NodeList::default(),
            load_balancer: default_load_balancer(),
            database: DEFAULT_DATABASE,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ping_timeout_ms: DEFAULT_PING_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            master_connection_pool_size: DEFAULT_MASTER_CONN_POOL_SIZE,
            slave_connection_pool_size: DEFAULT_SLAVE_CONN_POOL_SIZE,
            node_poll_interval_ms: DEFAULT_NODE_POLL_INTERVAL_MS,
            weights: HashMap::new(),
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

impl fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("nodes", &self.nodes)
            .field("load_balancer", &self.load_balancer)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("timeout_ms", &self.timeout_ms)
            .field("ping_timeout_ms", &self.ping_timeout_ms)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_interval_ms", &self.retry_interval_ms)
            .field("master_connection_pool_size", &self.master_connection_pool_size)
            .field("slave_connection_pool_size", &self.slave_connection_pool_size)
            .field("node_poll_interval_ms", &self.node_poll_interval_ms)
            .field("weights", &self.weights)
            .field("default_weight", &self.default_weight)
            .finish()
    }
}

impl ConnectionSpec {
    /// Create a connection spec for the given nodes with every other field at its default
    ///
    /// # Example
    ///
    /// ```
    /// use elasticache_session::cluster::ConnectionSpec;
    ///
    /// let spec = ConnectionSpec::new("a.example.com:6379 b.example.com:6379")
    ///     .with_master_connection_pool_size(32);
    /// assert_eq!(spec.nodes.entries().len(), 2);
    /// assert_eq!(spec.slave_connection_pool_size, 100);
    /// ```
    pub fn new<N: Into<NodeList>>(nodes: N) -> Self {
        Self {
            nodes: nodes.into(),
            ..Default::default()
        }
    }

    pub fn with_load_balancer<S: Into<String>>(mut self, name: S) -> Self {
        self.load_balancer = name.into();
        self
    }

    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }

    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_ping_timeout_ms(mut self, ping_timeout_ms: u64) -> Self {
        self.ping_timeout_ms = ping_timeout_ms;
        self
    }

    /// Set retry attempts and the interval between them
    pub fn with_retry(mut self, attempts: u32, interval_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_interval_ms = interval_ms;
        self
    }

    pub fn with_master_connection_pool_size(mut self, size: u32) -> Self {
        self.master_connection_pool_size = size;
        self
    }

    pub fn with_slave_connection_pool_size(mut self, size: u32) -> Self {
        self.slave_connection_pool_size = size;
        self
    }

    pub fn with_node_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.node_poll_interval_ms = interval_ms;
        self
    }

    /// Set the weight of one node ("host:port") for weighted balancing
    pub fn with_weight<S: Into<String>>(mut self, node: S, weight: u32) -> Self {
        self.weights.insert(node.into(), weight);
        self
    }

    pub fn with_default_weight(mut self, weight: u32) -> Self {
        self.default_weight = weight;
        self
    }
}

/// Where reads and writes are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Reads and writes go to the master
    Master,
    /// Reads go to replicas only
    Replica,
    /// Writes go to the master, reads go to replicas
    MasterReplica,
}

impl ReadMode {
    pub fn reads_from_replicas(self) -> bool {
        !matches!(self, ReadMode::Master)
    }
}

/// Validated connection settings for the cache-client runtime.
///
/// Built once by [`ClusterConfigurator`](super::ClusterConfigurator) and
/// never changed afterwards.
#[derive(Clone)]
pub struct ResolvedClusterConfig {
    pub(super) nodes: Vec<NodeAddress>,
    pub(super) database: i64,
    pub(super) password: Option<String>,
    pub(super) timeout: Duration,
    pub(super) ping_timeout: Duration,
    pub(super) retry_attempts: u32,
    pub(super) retry_interval: Duration,
    pub(super) master_connection_pool_size: u32,
    pub(super) slave_connection_pool_size: u32,
    pub(super) scan_interval: Duration,
    pub(super) read_mode: ReadMode,
    pub(super) load_balancer: Option<Arc<dyn LoadBalancer>>,
}

impl fmt::Debug for ResolvedClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedClusterConfig")
            .field("nodes", &self.nodes)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("timeout", &self.timeout)
            .field("ping_timeout", &self.ping_timeout)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_interval", &self.retry_interval)
            .field("master_connection_pool_size", &self.master_connection_pool_size)
            .field("slave_connection_pool_size", &self.slave_connection_pool_size)
            .field("scan_interval", &self.scan_interval)
            .field("read_mode", &self.read_mode)
            .field("load_balancer", &self.load_balancer)
            .finish()
    }
}

impl ResolvedClusterConfig {
    pub fn nodes(&self) -> &[NodeAddress] {
        &self.nodes
    }

    pub fn database(&self) -> i64 {
        self.database
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn master_connection_pool_size(&self) -> u32 {
        self.master_connection_pool_size
    }

    pub fn slave_connection_pool_size(&self) -> u32 {
        self.slave_connection_pool_size
    }

    /// Interval at which the runtime re-discovers the replication group topology
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    pub fn read_mode(&self) -> ReadMode {
        self.read_mode
    }

    /// Explicit load balancer, or `None` to use the runtime default
    pub fn load_balancer(&self) -> Option<&Arc<dyn LoadBalancer>> {
        self.load_balancer.as_ref()
    }

    /// Printable view with the password redacted
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            nodes: self.nodes.iter().map(NodeAddress::url).collect(),
            database: self.database,
            password: self.password.as_ref().map(|_| REDACTED.to_string()),
            timeout_ms: self.timeout.as_millis() as u64,
            ping_timeout_ms: self.ping_timeout.as_millis() as u64,
            retry_attempts: self.retry_attempts,
            retry_interval_ms: self.retry_interval.as_millis() as u64,
            master_connection_pool_size: self.master_connection_pool_size,
            slave_connection_pool_size: self.slave_connection_pool_size,
            scan_interval_ms: self.scan_interval.as_millis() as u64,
            read_mode: self.read_mode,
            load_balancer: self.load_balancer.as_ref().map(|lb| lb.name().to_string()),
        }
    }
}

/// Serializable snapshot of a [`ResolvedClusterConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub nodes: Vec<String>,
    pub database: i64,
    pub password: Option<String>,
    pub timeout_ms: u64,
    pub ping_timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_interval_ms: u64,
    pub master_connection_pool_size: u32,
    pub slave_connection_pool_size: u32,
    pub scan_interval_ms: u64,
    pub read_mode: ReadMode,
    pub load_balancer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_default() {
        let spec = ConnectionSpec::default();
        assert!(spec.nodes.entries().is_empty());
        assert_eq!(spec.load_balancer, "round_robin");
        assert_eq!(spec.master_connection_pool_size, 100);
        assert_eq!(spec.slave_connection_pool_size, 100);
        assert_eq!(spec.node_poll_interval_ms, 1_000);
    }

    #[test]
    fn test_node_list_entries() {
        let delimited = NodeList::from("a:1  b:2\tc:3");
        assert_eq!(delimited.entries(), vec!["a:1", "b:2", "c:3"]);

        let listed = NodeList::from(vec!["a:1".to_string(), " ".to_string()]);
        assert_eq!(listed.entries(), vec!["a:1", " "]);
    }

    #[test]
    fn test_deserialize_defaults() {
        let spec: ConnectionSpec = toml::from_str(r#"nodes = "a:6379""#).unwrap();
        assert_eq!(spec, ConnectionSpec::new("a:6379"));
    }

    #[test]
    fn test_deserialize_node_array() {
        let spec: ConnectionSpec = toml::from_str(
            r#"
            nodes = ["a:6379", "b:6379"]
            load_balancer = ""
            retry_attempts = 7
            "#,
        )
        .unwrap();
        assert_eq!(spec.nodes.entries(), vec!["a:6379", "b:6379"]);
        assert!(spec.load_balancer.is_empty());
        assert_eq!(spec.retry_attempts, 7);
        assert_eq!(spec.retry_interval_ms, DEFAULT_RETRY_INTERVAL_MS);
    }

    #[test]
    fn test_deserialize_weights() {
        let spec: ConnectionSpec = toml::from_str(
            r#"
            nodes = "a:6379 b:6379"
            load_balancer = "weighted_round_robin"
            default_weight = 2

            [weights]
            "a:6379" = 5
            "#,
        )
        .unwrap();
        assert_eq!(spec.weights.get("a:6379"), Some(&5));
        assert_eq!(spec.default_weight, 2);
        assert_eq!(ConnectionSpec::default().default_weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_debug_masks_password() {
        let spec = ConnectionSpec::new("a:6379").with_password("hunter2");
        let printed = format!("{:?}", spec);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("***"));

        let unset = format!("{:?}", ConnectionSpec::new("a:6379"));
        assert!(unset.contains("password: None"));
    }

    #[test]
    fn test_read_mode() {
        assert!(ReadMode::MasterReplica.reads_from_replicas());
        assert!(!ReadMode::Master.reads_from_replicas());
    }
}
