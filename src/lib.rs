pub mod balancer;
pub mod cluster;
pub mod error;
pub mod logging;
pub mod manager;
pub mod settings;

pub use balancer::{LoadBalancer, StrategyError, StrategyRegistry};
pub use cluster::{ClusterConfigurator, ConnectionSpec, ReadMode, ResolvedClusterConfig};
pub use error::{ElasticacheError, Result};
pub use manager::{ClientConfig, ElasticacheSessionManager, SessionManager};
pub use settings::Settings;
