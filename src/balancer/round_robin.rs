use super::LoadBalancer;
use crate::cluster::NodeAddress;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cycles through replicas in order
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalancer {
    cursor: AtomicUsize,
}

impl RoundRobinLoadBalancer {
    pub const NAME: &'static str = "round_robin";

    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobinLoadBalancer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select<'a>(&self, replicas: &'a [NodeAddress]) -> Option<&'a NodeAddress> {
        if replicas.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        replicas.get(index % replicas.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_in_order() {
        let lb = RoundRobinLoadBalancer::new();
        let replicas = vec![
            NodeAddress::new("a", 6379),
            NodeAddress::new("b", 6379),
            NodeAddress::new("c", 6379),
        ];

        let picked: Vec<&str> = (0..6)
            .filter_map(|_| lb.select(&replicas))
            .map(NodeAddress::host)
            .collect();
        assert_eq!(picked, vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn test_empty_replicas() {
        let lb = RoundRobinLoadBalancer::new();
        assert!(lb.select(&[]).is_none());
    }
}
