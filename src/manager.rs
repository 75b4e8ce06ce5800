//! Session-manager hook that wires an ElastiCache replication group into
//! the cache-client runtime configuration.

use crate::balancer::StrategyRegistry;
use crate::cluster::{ClusterConfigurator, ConnectionSpec, NodeList, ResolvedClusterConfig};
use crate::error::Result;
use tracing::info;

/// Runtime configuration context passed through the startup hook
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    elasticache: Option<ResolvedClusterConfig>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the runtime to an ElastiCache replication group
    pub fn use_elasticache_servers(&mut self, servers: ResolvedClusterConfig) -> &mut Self {
        self.elasticache = Some(servers);
        self
    }

    pub fn elasticache_servers(&self) -> Option<&ResolvedClusterConfig> {
        self.elasticache.as_ref()
    }
}

/// Startup hook implemented by session managers
pub trait SessionManager {
    /// Decorate the runtime configuration. Called once at startup; an error
    /// aborts startup.
    fn configure(&self, config: ClientConfig) -> Result<ClientConfig>;
}

/// Session manager for an AWS ElastiCache replication group
#[derive(Debug, Clone)]
pub struct ElasticacheSessionManager {
    spec: ConnectionSpec,
    configurator: ClusterConfigurator,
}

impl ElasticacheSessionManager {
    pub fn new(spec: ConnectionSpec) -> Self {
        Self {
            spec,
            configurator: ClusterConfigurator::default(),
        }
    }

    /// Use a custom strategy registry instead of the built-in one
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.configurator = ClusterConfigurator::new(registry);
        self
    }

    pub fn spec(&self) -> &ConnectionSpec {
        &self.spec
    }

    pub fn nodes(&self) -> &NodeList {
        &self.spec.nodes
    }

    pub fn load_balancer(&self) -> &str {
        &self.spec.load_balancer
    }

    pub fn master_connection_pool_size(&self) -> u32 {
        self.spec.master_connection_pool_size
    }

    pub fn slave_connection_pool_size(&self) -> u32 {
        self.spec.slave_connection_pool_size
    }

    pub fn node_poll_interval_ms(&self) -> u64 {
        self.spec.node_poll_interval_ms
    }
}

impl SessionManager for ElasticacheSessionManager {
    fn configure(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        let resolved = self.configurator.build(&self.spec)?;
        info!(
            nodes = resolved.nodes().len(),
            read_mode = ?resolved.read_mode(),
            "Configured ElastiCache replication group"
        );
        config.use_elasticache_servers(resolved);
        Ok(config)
    }
}
