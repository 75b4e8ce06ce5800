//! Bridge from a resolved configuration to `redis` client handles

use super::config::ResolvedClusterConfig;
use crate::error::Result;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};

impl ResolvedClusterConfig {
    /// Connection info for every node, carrying the database index and password
    pub fn connection_infos(&self) -> Result<Vec<ConnectionInfo>> {
        self.nodes
            .iter()
            .map(|node| -> Result<ConnectionInfo> {
                let mut info = node.url().as_str().into_connection_info()?;
                info.redis.db = self.database;
                info.redis.password = self.password.clone();
                Ok(info)
            })
            .collect()
    }

    /// One client per node. No connection is opened.
    pub fn open_clients(&self) -> Result<Vec<Client>> {
        self.connection_infos()?
            .into_iter()
            .map(|info| Client::open(info).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::{ClusterConfigurator, ConnectionSpec};
    use redis::ConnectionAddr;

    #[test]
    fn test_connection_infos() {
        let spec = ConnectionSpec::new("a.example.com:6379 b.example.com:6380")
            .with_database(2)
            .with_password("s3cret");
        let resolved = ClusterConfigurator::default().build(&spec).unwrap();

        let infos = resolved.connection_infos().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(
            infos[1].addr,
            ConnectionAddr::Tcp("b.example.com".to_string(), 6380)
        );
        for info in &infos {
            assert_eq!(info.redis.db, 2);
            assert_eq!(info.redis.password.as_deref(), Some("s3cret"));
        }
    }

    #[test]
    fn test_tls_nodes_stay_encrypted() {
        let spec = ConnectionSpec::new("rediss://secure.example.com:6380 plain.example.com:6379")
            .with_password("s3cret");
        let resolved = ClusterConfigurator::default().build(&spec).unwrap();

        let infos = resolved.connection_infos().unwrap();
        match &infos[0].addr {
            ConnectionAddr::TcpTls { host, port, .. } => {
                assert_eq!(host, "secure.example.com");
                assert_eq!(*port, 6380);
            }
            other => panic!("expected a TLS address, got {:?}", other),
        }
        assert_eq!(
            infos[1].addr,
            ConnectionAddr::Tcp("plain.example.com".to_string(), 6379)
        );
    }

    #[test]
    fn test_every_built_node_converts() {
        let resolved = ClusterConfigurator::default()
            .build(&ConnectionSpec::new("[::1]:6379 cache_01.internal:6379"))
            .unwrap();
        assert_eq!(resolved.connection_infos().unwrap().len(), 2);
    }

    #[test]
    fn test_open_clients_does_not_connect() {
        let resolved = ClusterConfigurator::default()
            .build(&ConnectionSpec::new("127.0.0.1:1 127.0.0.1:2"))
            .unwrap();
        assert_eq!(resolved.open_clients().unwrap().len(), 2);
    }
}
