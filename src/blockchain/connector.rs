use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Provider, Ws};
use tracing::info;

use super::ethereum::EthersSession;
use super::traits::{ChainConnection, ChainConnector};
use crate::core::errors::DappError;

/// Trim and validate a node URL. Only `ws` and `wss` endpoints with a host pass.
pub fn validate_node_url(node_url: &str) -> Result<reqwest::Url, DappError> {
    let node_url_clean = node_url.trim();
    if node_url_clean.is_empty() {
        return Err(DappError::InvalidUrl("node URL is empty".to_string()));
    }
    let parsed = reqwest::Url::parse(node_url_clean)
        .map_err(|e| DappError::InvalidUrl(format!("'{}': {}", node_url_clean, e)))?;
    match parsed.scheme() {
        "ws" | "wss" if parsed.host().is_some() => Ok(parsed),
        "ws" | "wss" => Err(DappError::InvalidUrl(format!("'{}': missing host", node_url_clean))),
        other => Err(DappError::InvalidUrl(format!(
            "'{}': unsupported scheme {}, expected ws or wss",
            node_url_clean, other
        ))),
    }
}

/// Opens WebSocket sessions with `ethers`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    ready_timeout: Duration,
}

impl WsConnector {
    pub fn new(ready_timeout: Duration) -> Self {
        Self { ready_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl ChainConnector for WsConnector {
    async fn connect(&self, node_url: &str) -> Result<ChainConnection, DappError> {
        let url = validate_node_url(node_url)?;
        info!("Connecting to chain node: {}", url);

        let handshake = async {
            let ws = Ws::connect(url.as_str())
                .await
                .map_err(|e| DappError::Connection(format!("{}: {}", url, e)))?;
            EthersSession::ready(Provider::new(ws), url.as_str()).await
        };
        let session = tokio::time::timeout(self.ready_timeout, handshake).await.map_err(|_| {
            DappError::Timeout(format!("{} not ready after {:?}", url, self.ready_timeout))
        })??;

        Ok(ChainConnection::new(Arc::new(session)))
    }
}
