use super::config::{ConnectionSpec, ReadMode, ResolvedClusterConfig};
use super::node::parse_nodes;
use crate::balancer::{LoadBalancer, StrategyOptions, StrategyRegistry};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Turns a [`ConnectionSpec`] into a [`ResolvedClusterConfig`]
#[derive(Debug, Clone)]
pub struct ClusterConfigurator {
    registry: StrategyRegistry,
}

impl Default for ClusterConfigurator {
    fn default() -> Self {
        Self::new(StrategyRegistry::with_defaults())
    }
}

impl ClusterConfigurator {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Validate `spec` and produce the resolved configuration.
    ///
    /// Fails only when the node list is blank or contains a malformed entry.
    /// A load balancer that cannot be resolved is logged and left unset.
    ///
    /// # Example
    ///
    /// ```
    /// use elasticache_session::cluster::{ClusterConfigurator, ConnectionSpec, ReadMode};
    ///
    /// let spec = ConnectionSpec::new("a.example.com:6379 b.example.com:6379")
    ///     .with_load_balancer("");
    /// let resolved = ClusterConfigurator::default().build(&spec).unwrap();
    ///
    /// assert_eq!(resolved.nodes().len(), 2);
    /// assert!(resolved.load_balancer().is_none());
    /// assert_eq!(resolved.read_mode(), ReadMode::MasterReplica);
    /// ```
    pub fn build(&self, spec: &ConnectionSpec) -> Result<ResolvedClusterConfig> {
        let nodes = parse_nodes(spec.nodes.entries())?;
        let options = StrategyOptions {
            weights: spec.weights.clone(),
            default_weight: spec.default_weight,
        };
        let load_balancer = self.resolve_load_balancer(&spec.load_balancer, &options);

        debug!(
            nodes = nodes.len(),
            load_balancer = load_balancer.as_ref().map(|lb| lb.name()),
            "Resolved ElastiCache cluster configuration"
        );

        Ok(ResolvedClusterConfig {
            nodes,
            database: spec.database,
            password: spec.password.clone(),
            timeout: Duration::from_millis(spec.timeout_ms),
            ping_timeout: Duration::from_millis(spec.ping_timeout_ms),
            retry_attempts: spec.retry_attempts,
            retry_interval: Duration::from_millis(spec.retry_interval_ms),
            master_connection_pool_size: spec.master_connection_pool_size,
            slave_connection_pool_size: spec.slave_connection_pool_size,
            scan_interval: Duration::from_millis(spec.node_poll_interval_ms),
            read_mode: ReadMode::MasterReplica,
            load_balancer,
        })
    }

    fn resolve_load_balancer(
        &self,
        name: &str,
        options: &StrategyOptions,
    ) -> Option<Arc<dyn LoadBalancer>> {
        if name.trim().is_empty() {
            return None;
        }

        match self.registry.resolve(name, options) {
            Ok(lb) => Some(lb),
            Err(e) => {
                error!(error = %e, "Failed to instantiate LoadBalancer");
                None
            }
        }
    }
}
