use super::{LoadBalancer, StrategyError};
use crate::cluster::NodeAddress;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cycles through replicas, visiting each one `weight` times per round.
///
/// Weights are keyed by `host:port`; replicas without an entry use the
/// default weight.
#[derive(Debug)]
pub struct WeightedRoundRobinLoadBalancer {
    weights: HashMap<String, u32>,
    default_weight: u32,
    cursor: AtomicU64,
}

impl WeightedRoundRobinLoadBalancer {
    pub const NAME: &'static str = "weighted_round_robin";

    /// Create a weighted balancer. Zero weights are rejected.
    pub fn new(
        weights: HashMap<String, u32>,
        default_weight: u32,
    ) -> Result<Self, StrategyError> {
        if default_weight == 0 {
            return Err(construction("default weight must be positive".to_string()));
        }
        if let Some((addr, _)) = weights.iter().find(|(_, weight)| **weight == 0) {
            return Err(construction(format!("weight for '{}' must be positive", addr)));
        }

        Ok(Self {
            weights,
            default_weight,
            cursor: AtomicU64::new(0),
        })
    }

    fn weight_of(&self, node: &NodeAddress) -> u64 {
        u64::from(
            self.weights
                .get(&node.to_string())
                .copied()
                .unwrap_or(self.default_weight),
        )
    }
}

fn construction(reason: String) -> StrategyError {
    StrategyError::Construction {
        name: WeightedRoundRobinLoadBalancer::NAME.to_string(),
        reason,
    }
}

impl LoadBalancer for WeightedRoundRobinLoadBalancer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select<'a>(&self, replicas: &'a [NodeAddress]) -> Option<&'a NodeAddress> {
        let total: u64 = replicas.iter().map(|node| self.weight_of(node)).sum();
        if total == 0 {
            return None;
        }

        let mut slot = self.cursor.fetch_add(1, Ordering::Relaxed) % total;
        for node in replicas {
            let weight = self.weight_of(node);
            if slot < weight {
                return Some(node);
            }
            slot -= weight;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respects_weights() {
        let mut weights = HashMap::new();
        weights.insert("a:6379".to_string(), 3);
        let lb = WeightedRoundRobinLoadBalancer::new(weights, 1).unwrap();
        let replicas = vec![NodeAddress::new("a", 6379), NodeAddress::new("b", 6379)];

        let picked: Vec<&str> = (0..8)
            .filter_map(|_| lb.select(&replicas))
            .map(NodeAddress::host)
            .collect();
        assert_eq!(picked, vec!["a", "a", "a", "b", "a", "a", "a", "b"]);
    }

    #[test]
    fn test_equal_weights_behave_like_round_robin() {
        let lb = WeightedRoundRobinLoadBalancer::new(HashMap::new(), 2).unwrap();
        let replicas = vec![NodeAddress::new("a", 1), NodeAddress::new("b", 1)];

        let picked: Vec<&str> = (0..4)
            .filter_map(|_| lb.select(&replicas))
            .map(NodeAddress::host)
            .collect();
        assert_eq!(picked, vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn test_rejects_zero_weight() {
        assert!(WeightedRoundRobinLoadBalancer::new(HashMap::new(), 0).is_err());

        let mut weights = HashMap::new();
        weights.insert("a:6379".to_string(), 0);
        let err = WeightedRoundRobinLoadBalancer::new(weights, 1).unwrap_err();
        assert!(err.to_string().contains("a:6379"));
    }

    #[test]
    fn test_empty_replicas() {
        let lb = WeightedRoundRobinLoadBalancer::new(HashMap::new(), 1).unwrap();
        assert!(lb.select(&[]).is_none());
    }
}
