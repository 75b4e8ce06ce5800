//! Node addresses for an ElastiCache replication group

use crate::error::{ElasticacheError, Result};
use redis::IntoConnectionInfo;
use serde::Serialize;
use std::fmt;
use std::net::Ipv6Addr;

/// Example node string shown when the node list is missing or malformed
pub const NODES_FORMAT_HINT: &str = "nodes=\"node1.com:6379 node2.com:6379\"";

const PLAIN_SCHEME: &str = "redis://";
const TLS_SCHEME: &str = "rediss://";

/// A single `host:port` endpoint of the replication group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeAddress {
    host: String,
    port: u16,
    tls: bool,
}

impl NodeAddress {
    /// Create a plaintext node address from its parts
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: false,
        }
    }

    /// Create a node address that requires in-transit encryption
    pub fn with_tls<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            tls: true,
            ..Self::new(host, port)
        }
    }

    /// Parse a `host:port` entry, optionally prefixed with `redis://` or
    /// `rediss://`. The `rediss://` prefix marks the node as TLS.
    ///
    /// IPv6 hosts must be bracketed, e.g. `[::1]:6379`.
    ///
    /// # Example
    ///
    /// ```
    /// use elasticache_session::cluster::NodeAddress;
    ///
    /// let node = NodeAddress::parse("rediss://a.example.com:6379").unwrap();
    /// assert_eq!(node.host(), "a.example.com");
    /// assert_eq!(node.port(), 6379);
    /// assert!(node.is_tls());
    /// ```
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let (stripped, tls) = if let Some(rest) = entry.strip_prefix(TLS_SCHEME) {
            (rest, true)
        } else if let Some(rest) = entry.strip_prefix(PLAIN_SCHEME) {
            (rest, false)
        } else {
            (entry, false)
        };

        let (host, port) = stripped
            .rsplit_once(':')
            .ok_or_else(|| malformed(entry, "missing port"))?;

        validate_host(host).map_err(|reason| malformed(entry, reason))?;

        let port: u16 = port
            .parse()
            .map_err(|_| malformed(entry, "invalid port"))?;

        let node = Self {
            host: host.to_string(),
            port,
            tls,
        };

        // The runtime must accept every address that passes here
        node.url()
            .as_str()
            .into_connection_info()
            .map_err(|_| malformed(entry, "rejected by the redis client"))?;

        Ok(node)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// `redis://host:port`, or `rediss://host:port` for TLS nodes
    pub fn url(&self) -> String {
        let scheme = if self.tls { TLS_SCHEME } else { PLAIN_SCHEME };
        format!("{}{}", scheme, self)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn validate_host(host: &str) -> std::result::Result<(), &'static str> {
    if host.is_empty() {
        return Err("missing host");
    }

    if let Some(inner) = host.strip_prefix('[') {
        return inner
            .strip_suffix(']')
            .and_then(|addr| addr.parse::<Ipv6Addr>().ok())
            .map(|_| ())
            .ok_or("invalid IPv6 host");
    }

    if host.contains(':') {
        return Err("IPv6 hosts must be bracketed");
    }

    let legal = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    if !legal {
        return Err("illegal character in host");
    }

    Ok(())
}

fn malformed(entry: &str, reason: &str) -> ElasticacheError {
    ElasticacheError::Configuration(format!(
        "Invalid node address '{}' ({}). Expected host:port entries, e.g. {}",
        entry, reason, NODES_FORMAT_HINT
    ))
}

/// Parse a list of node entries, skipping blank ones.
///
/// Fails when no entry remains or when any entry is malformed.
pub fn parse_nodes<'a, I>(entries: I) -> Result<Vec<NodeAddress>>
where
    I: IntoIterator<Item = &'a str>,
{
    let nodes = entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(NodeAddress::parse)
        .collect::<Result<Vec<_>>>()?;

    if nodes.is_empty() {
        return Err(ElasticacheError::Configuration(format!(
            "Manager must specify node string. e.g., {}",
            NODES_FORMAT_HINT
        )));
    }

    Ok(nodes)
}
