//! Read load-balancing strategies for replica selection.
//!
//! Strategies are looked up by name in a [`StrategyRegistry`] when the
//! cluster configuration is built. The registry maps names to factory
//! closures, so a custom strategy is added with [`StrategyRegistry::register`]
//! instead of being loaded dynamically.
//!
//! ```
//! use elasticache_session::balancer::{StrategyOptions, StrategyRegistry};
//!
//! let registry = StrategyRegistry::with_defaults();
//! let options = StrategyOptions::default();
//! let strategy = registry.resolve("round_robin", &options).unwrap();
//! assert_eq!(strategy.name(), "round_robin");
//! assert!(registry.resolve("least_connections", &options).is_err());
//! ```

mod random;
mod round_robin;
mod weighted;

pub use random::RandomLoadBalancer;
pub use round_robin::RoundRobinLoadBalancer;
pub use weighted::WeightedRoundRobinLoadBalancer;

use crate::cluster::NodeAddress;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Strategy used when the configuration does not name one
pub const DEFAULT_LOAD_BALANCER: &str = RoundRobinLoadBalancer::NAME;

/// Selects which replica serves a read request
pub trait LoadBalancer: Send + Sync + fmt::Debug {
    /// Registry name of this strategy
    fn name(&self) -> &str;

    /// Pick a replica, or `None` if there are no replicas
    fn select<'a>(&self, replicas: &'a [NodeAddress]) -> Option<&'a NodeAddress>;
}

/// Failure to produce a strategy from its name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Unknown load balancer '{0}'")]
    NotFound(String),

    #[error("Failed to construct load balancer '{name}': {reason}")]
    Construction { name: String, reason: String },
}

/// Settings handed to every strategy factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOptions {
    /// Per-node weights keyed by "host:port"
    pub weights: HashMap<String, u32>,
    /// Weight of nodes missing from `weights`
    pub default_weight: u32,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            default_weight: 1,
        }
    }
}

/// Factory producing a fresh strategy instance
pub type StrategyFactory = Arc<
    dyn Fn(&StrategyOptions) -> Result<Arc<dyn LoadBalancer>, StrategyError> + Send + Sync,
>;

/// Name to factory mapping for load-balancing strategies
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in strategies registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RoundRobinLoadBalancer::NAME, |_| {
            Ok(Arc::new(RoundRobinLoadBalancer::new()))
        });
        registry.register(RandomLoadBalancer::NAME, |_| {
            Ok(Arc::new(RandomLoadBalancer::new()))
        });
        registry.register(WeightedRoundRobinLoadBalancer::NAME, |options| {
            Ok(Arc::new(WeightedRoundRobinLoadBalancer::new(
                options.weights.clone(),
                options.default_weight,
            )?))
        });
        registry
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<S, F>(&mut self, name: S, factory: F) -> &mut Self
    where
        S: Into<String>,
        F: Fn(&StrategyOptions) -> Result<Arc<dyn LoadBalancer>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Construct the strategy registered under `name`
    pub fn resolve(
        &self,
        name: &str,
        options: &StrategyOptions,
    ) -> Result<Arc<dyn LoadBalancer>, StrategyError> {
        let name = name.trim();
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        factory(options)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name.trim())
    }

    /// Registered strategy names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["random", "round_robin", "weighted_round_robin"]
        );
        assert!(registry.contains(DEFAULT_LOAD_BALANCER));
    }

    #[test]
    fn test_resolve_trims_name() {
        let registry = StrategyRegistry::with_defaults();
        let strategy = registry
            .resolve("  random ", &StrategyOptions::default())
            .unwrap();
        assert_eq!(strategy.name(), "random");
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = StrategyRegistry::with_defaults();
        let err = registry
            .resolve("com.example.MissingBalancer", &StrategyOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::NotFound("com.example.MissingBalancer".to_string())
        );
    }

    #[test]
    fn test_register_custom_factory() {
        let mut registry = StrategyRegistry::new();
        registry.register("broken", |_| {
            Err(StrategyError::Construction {
                name: "broken".to_string(),
                reason: "no replicas weighted".to_string(),
            })
        });
        registry.register("rr", |_| Ok(Arc::new(RoundRobinLoadBalancer::new())));

        let options = StrategyOptions::default();
        assert!(matches!(
            registry.resolve("broken", &options),
            Err(StrategyError::Construction { .. })
        ));
        assert_eq!(registry.resolve("rr", &options).unwrap().name(), "round_robin");
    }

    #[test]
    fn test_weighted_default_uses_options() {
        let registry = StrategyRegistry::with_defaults();
        let mut options = StrategyOptions::default();
        options.weights.insert("b:2".to_string(), 2);

        let lb = registry.resolve("weighted_round_robin", &options).unwrap();
        let replicas = vec![NodeAddress::new("a", 1), NodeAddress::new("b", 2)];
        let picked: Vec<&str> = (0..3)
            .filter_map(|_| lb.select(&replicas))
            .map(NodeAddress::host)
            .collect();
        assert_eq!(picked, vec!["a", "b", "b"]);

        options.default_weight = 0;
        assert!(matches!(
            registry.resolve("weighted_round_robin", &options),
            Err(StrategyError::Construction { .. })
        ));
    }

    #[test]
    fn test_each_resolve_builds_fresh_instance() {
        let registry = StrategyRegistry::with_defaults();
        let options = StrategyOptions::default();
        let replicas = vec![NodeAddress::new("a", 1), NodeAddress::new("b", 2)];

        let first = registry.resolve("round_robin", &options).unwrap();
        assert_eq!(first.select(&replicas), Some(&replicas[0]));

        let second = registry.resolve("round_robin", &options).unwrap();
        assert_eq!(second.select(&replicas), Some(&replicas[0]));
    }
}
