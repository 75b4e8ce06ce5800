//! Settings file loading
//!
//! ```toml
//! [elasticache]
//! nodes = "node1.com:6379 node2.com:6379"
//! load_balancer = "round_robin"
//!
//! [logging]
//! level = "info"
//! ```

use crate::cluster::ConnectionSpec;
use crate::error::Result;
use crate::logging::LogConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Root settings structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub elasticache: ConnectionSpec,
    #[serde(default)]
    pub logging: LogConfig,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ElasticacheError;
    use crate::logging::LogFormat;

    #[test]
    fn test_empty_settings() {
        let settings = Settings::from_toml_str("").unwrap();
        assert!(settings.elasticache.nodes.entries().is_empty());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::from_toml_str(
            r#"
            [elasticache]
            nodes = "a.example.com:6379 b.example.com:6379"
            load_balancer = "random"
            password = "hunter2"
            master_connection_pool_size = 64

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.elasticache.nodes.entries().len(), 2);
        assert_eq!(settings.elasticache.load_balancer, "random");
        assert_eq!(settings.elasticache.password.as_deref(), Some("hunter2"));
        assert_eq!(settings.elasticache.master_connection_pool_size, 64);
        assert_eq!(settings.elasticache.slave_connection_pool_size, 100);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml_str("[elasticache\nnodes = 1").unwrap_err();
        assert!(matches!(err, ElasticacheError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_file("/nonexistent/elasticache.toml").unwrap_err();
        assert!(matches!(err, ElasticacheError::Io(_)));
    }
}
