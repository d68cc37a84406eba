use thiserror::Error;

/// Error type shared by every step of the connect / inspect / deploy workflow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DappError {
    /// The node URL is empty, malformed or uses an unsupported scheme.
    #[error("Invalid node URL: {0}")]
    InvalidUrl(String),

    /// Transport could not be opened or the handshake failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node did not become ready in time.
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Wallet host or extension failures.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The wallet refused or failed to sign.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// A JSON-RPC query against the node failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Contract artifact could not be read or parsed.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Contract creation was rejected, reverted or lost.
    #[error("Deployment failed: {0}")]
    Deployment(String),

    /// Configuration file or environment problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested operation is already running.
    #[error("Busy: {0}")]
    Busy(String),

    /// Wallet and account selection is frozen after a contract was deployed.
    #[error("Selection locked: a contract has already been deployed in this session")]
    SelectionLocked,

    #[error("IO error: {0}")]
    Io(String),
}

impl DappError {
    /// Whether retrying the same call may succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DappError::Connection(_) | DappError::Timeout(_) | DappError::Rpc(_)
        )
    }
}

impl From<std::io::Error> for DappError {
    fn from(err: std::io::Error) -> Self {
        DappError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DappError {
    fn from(err: serde_json::Error) -> Self {
        DappError::Artifact(err.to_string())
    }
}
