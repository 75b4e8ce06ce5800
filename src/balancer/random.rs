use super::LoadBalancer;
use crate::cluster::NodeAddress;
use rand::seq::SliceRandom;

/// Picks a replica uniformly at random
#[derive(Debug, Default)]
pub struct RandomLoadBalancer;

impl RandomLoadBalancer {
    pub const NAME: &'static str = "random";

    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for RandomLoadBalancer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select<'a>(&self, replicas: &'a [NodeAddress]) -> Option<&'a NodeAddress> {
        replicas.choose(&mut rand::thread_rng())
    }
}
